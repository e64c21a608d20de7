use timetrack_core::calendar::WorkingCalendar;
use timetrack_core::entry_validation::{HourLimits, DEFAULT_DAILY_HOUR_CAP};

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_HOURS};

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Every field except the JWT secret has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGIN`.
    pub cors_origins: Vec<String>,
    /// SQLite database file.
    pub db_path: String,
    /// `production` hides internal error details from responses.
    pub app_env: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// One cap applied to a single entry and to a day's total.
    pub limits: HourLimits,
    /// Weekends plus configured holidays.
    pub calendar: WorkingCalendar,
    /// Seed demo data into an empty database at startup.
    pub seed_demo_data: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                   |
    /// |------------------------|---------------------------|
    /// | `HOST`                 | `0.0.0.0`                 |
    /// | `PORT`                 | `3001`                    |
    /// | `CORS_ORIGIN`          | `http://localhost:5173`   |
    /// | `DB_PATH`              | `database/timetracker.db` |
    /// | `APP_ENV`              | `development`             |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                      |
    /// | `JWT_SECRET`           | **required**              |
    /// | `JWT_EXPIRY_HOURS`     | `12`                      |
    /// | `DAILY_HOUR_CAP`       | `12`                      |
    /// | `HOLIDAYS`             | empty                     |
    /// | `SEED_DEMO_DATA`       | `false`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGIN", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let hour_cap: f64 = parse(
            "DAILY_HOUR_CAP",
            &var("DAILY_HOUR_CAP", &DEFAULT_DAILY_HOUR_CAP.to_string()),
        )?;
        if !hour_cap.is_finite() || hour_cap <= 0.0 {
            return Err(ConfigError::Invalid {
                var: "DAILY_HOUR_CAP",
                value: hour_cap.to_string(),
                reason: "must be a positive number of hours".into(),
            });
        }

        let holidays = var("HOLIDAYS", "");
        let calendar = WorkingCalendar::parse_holidays(&holidays).map_err(|e| ConfigError::Invalid {
            var: "HOLIDAYS",
            value: holidays.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", &var("PORT", "3001"))?,
            cors_origins,
            db_path: var("DB_PATH", "database/timetracker.db"),
            app_env: var("APP_ENV", "development"),
            request_timeout_secs: parse("REQUEST_TIMEOUT_SECS", &var("REQUEST_TIMEOUT_SECS", "30"))?,
            jwt: JwtConfig {
                secret,
                expiry_hours: parse(
                    "JWT_EXPIRY_HOURS",
                    &var("JWT_EXPIRY_HOURS", &DEFAULT_EXPIRY_HOURS.to_string()),
                )?,
            },
            limits: HourLimits::uniform(hour_cap),
            calendar,
            seed_demo_data: parse_bool("SEED_DEMO_DATA", &var("SEED_DEMO_DATA", "false"))?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.db_path, "database/timetracker.db");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.jwt.expiry_hours, 12);
        assert_eq!(config.limits, HourLimits::default());
        assert_eq!(config.calendar, WorkingCalendar::default());
        assert!(!config.seed_demo_data);
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_secret_is_error() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "http://a.test, http://b.test"),
            ("APP_ENV", "production"),
            ("DAILY_HOUR_CAP", "10"),
            ("HOLIDAYS", "2024-12-25,2025-01-01"),
            ("SEED_DEMO_DATA", "true"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.is_production());
        assert_eq!(config.limits, HourLimits::uniform(10.0));
        assert_eq!(config.calendar.holidays().count(), 2);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert_matches!(
            load(&[("JWT_SECRET", "s"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
        for cap in ["0", "-3", "NaN", "inf"] {
            assert_matches!(
                load(&[("JWT_SECRET", "s"), ("DAILY_HOUR_CAP", cap)]),
                Err(ConfigError::Invalid { var: "DAILY_HOUR_CAP", .. }),
                "cap {cap} should be rejected"
            );
        }
        assert_matches!(
            load(&[("JWT_SECRET", "s"), ("HOLIDAYS", "christmas")]),
            Err(ConfigError::Invalid { var: "HOLIDAYS", .. })
        );
        assert_matches!(
            load(&[("JWT_SECRET", "s"), ("SEED_DEMO_DATA", "maybe")]),
            Err(ConfigError::Invalid { var: "SEED_DEMO_DATA", .. })
        );
    }
}
