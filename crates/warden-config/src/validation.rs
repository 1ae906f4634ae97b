//! Configuration validation

use crate::policy::{DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_QUICK_IDLE_TIMEOUT_SECS};
use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("check_interval_ms must be greater than 0")]
    ZeroCheckInterval,

    #[error("idle_timeout_seconds must be greater than 0")]
    ZeroIdleTimeout,

    #[error("quick_idle_timeout_seconds ({quick}s) exceeds idle_timeout_seconds ({idle}s)")]
    QuickTimeoutExceedsIdle { quick: u64, idle: u64 },

    #[error("required_version cannot be empty")]
    EmptyRequiredVersion,
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.expiration.check_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroCheckInterval);
    }

    if config.expiration.idle_timeout_seconds == Some(0) {
        errors.push(ValidationError::ZeroIdleTimeout);
    }

    // Compare the effective values: an omitted field falls back to its default
    let idle = config
        .expiration
        .idle_timeout_seconds
        .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS);
    let quick = config
        .expiration
        .quick_idle_timeout_seconds
        .unwrap_or(DEFAULT_QUICK_IDLE_TIMEOUT_SECS);
    if idle > 0 && quick > idle {
        errors.push(ValidationError::QuickTimeoutExceedsIdle { quick, idle });
    }

    if let Some(version) = &config.expiration.required_version
        && version.trim().is_empty()
    {
        errors.push(ValidationError::EmptyRequiredVersion);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDaemonConfig, RawExpirationConfig};

    fn raw_with(expiration: RawExpirationConfig) -> RawConfig {
        RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
            expiration,
        }
    }

    #[test]
    fn valid_defaults_pass() {
        let config = raw_with(RawExpirationConfig::default());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn zero_check_interval_rejected() {
        let config = raw_with(RawExpirationConfig {
            check_interval_ms: Some(0),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::ZeroCheckInterval)));
    }

    #[test]
    fn quick_timeout_cannot_exceed_idle_timeout() {
        let config = raw_with(RawExpirationConfig {
            idle_timeout_seconds: Some(60),
            quick_idle_timeout_seconds: Some(120),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::QuickTimeoutExceedsIdle {
                quick: 120,
                idle: 60
            }
        )));
    }

    #[test]
    fn quick_timeout_checked_against_default_idle() {
        // Omitted idle_timeout falls back to the default before comparison
        let config = raw_with(RawExpirationConfig {
            quick_idle_timeout_seconds: Some(DEFAULT_IDLE_TIMEOUT_SECS + 1),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::QuickTimeoutExceedsIdle { .. })));
    }

    #[test]
    fn empty_required_version_rejected() {
        let config = raw_with(RawExpirationConfig {
            required_version: Some("  ".into()),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyRequiredVersion)));
    }
}
