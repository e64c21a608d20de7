//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod client_repo;
pub mod project_repo;
pub mod template_repo;
pub mod time_entry_repo;
pub mod user_repo;

pub use client_repo::ClientRepo;
pub use project_repo::ProjectRepo;
pub use template_repo::TemplateRepo;
pub use time_entry_repo::TimeEntryRepo;
pub use user_repo::UserRepo;
