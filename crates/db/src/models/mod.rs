//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the (possibly joined) database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches
//!
//! Everything that reaches the wire serializes with camelCase field names.

pub mod client;
pub mod project;
pub mod template;
pub mod time_entry;
pub mod user;
