//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (period and deadlines > 0)
//! - Reject empty paths and unknown log levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::WatcherConfig;

/// Upper bound on the sync period: one day.
pub const MAX_SYNC_PERIOD_SECS: u64 = 86_400;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check every field, collecting all problems found.
pub fn validate_config(config: &WatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive = [
        ("sync.period_secs", config.sync.period_secs),
        ("cluster.fetch_timeout_secs", config.cluster.fetch_timeout_secs),
        ("reload.timeout_secs", config.reload.timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.sync.period_secs > MAX_SYNC_PERIOD_SECS {
        errors.push(ValidationError::TooLarge {
            field: "sync.period_secs",
            max: MAX_SYNC_PERIOD_SECS,
        });
    }

    let paths: [(&'static str, &Path); 4] = [
        ("cluster.kubeconfig", config.cluster.kubeconfig.as_path()),
        ("template.path", config.template.path.as_path()),
        ("template.output", config.template.output.as_path()),
        ("reload.command", config.reload.command.as_path()),
    ];
    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WatcherConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WatcherConfig::default();
        config.sync.period_secs = 0;
        config.reload.timeout_secs = 0;
        config.template.output = PathBuf::new();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero {
            field: "sync.period_secs"
        }));
        assert!(errors.contains(&ValidationError::Empty {
            field: "template.output"
        }));
        assert!(errors.contains(&ValidationError::LogLevel("loud".into())));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = WatcherConfig::default();
        config.observability.metrics_address = "not-an-address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("not-an-address".into())]
        );
    }

    #[test]
    fn test_sync_period_upper_bound() {
        let mut config = WatcherConfig::default();
        config.sync.period_secs = MAX_SYNC_PERIOD_SECS;
        assert!(validate_config(&config).is_ok());

        config.sync.period_secs = u64::MAX;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::TooLarge {
                field: "sync.period_secs",
                max: MAX_SYNC_PERIOD_SECS
            }]
        );
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = WatcherConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
