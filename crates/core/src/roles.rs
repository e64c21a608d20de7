//! Well-known role names and the [`Role`] enum.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20240101000001_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LEADER: &str = "leader";
pub const ROLE_DEVELOPER: &str = "developer";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_LEADER, ROLE_DEVELOPER];

/// A user's role. Gates which API operations the user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Leader,
    Developer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Leader => ROLE_LEADER,
            Role::Developer => ROLE_DEVELOPER,
        }
    }

    /// Admins and leaders may read other users' time entries and reports.
    pub fn can_review(self) -> bool {
        matches!(self, Role::Admin | Role::Leader)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_LEADER => Ok(Role::Leader),
            ROLE_DEVELOPER => Ok(Role::Developer),
            other => Err(CoreError::Validation(format!(
                "Invalid role: '{other}'. Valid roles: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_valid_role() {
        for name in VALID_ROLES {
            let role: Role = name.parse().expect("valid role should parse");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Invalid role: 'owner'"));
    }

    #[test]
    fn role_names_are_case_sensitive() {
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::Leader).unwrap();
        assert_eq!(json, "\"leader\"");
        let role: Role = serde_json::from_str("\"developer\"").unwrap();
        assert_eq!(role, Role::Developer);
    }

    #[test]
    fn only_admin_and_leader_review() {
        assert!(Role::Admin.can_review());
        assert!(Role::Leader.can_review());
        assert!(!Role::Developer.can_review());
    }
}
