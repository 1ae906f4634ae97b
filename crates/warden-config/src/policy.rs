//! Validated policy structures

use crate::schema::RawConfig;
use std::path::PathBuf;
use std::time::Duration;
use warden_util::socket_path_without_env;

/// Default continuous idle time before the daemon retires: 3 hours
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3 * 60 * 60;

/// Default short idle grace period for the pressure criteria
pub const DEFAULT_QUICK_IDLE_TIMEOUT_SECS: u64 = 30;

/// Default free-memory floor: 256 MiB
pub const DEFAULT_MIN_FREE_MEMORY_BYTES: u64 = 256 * 1024 * 1024;

/// Default expiration check cadence
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 10_000;

/// Validated policy ready for use by the supervisor
#[derive(Debug, Clone)]
pub struct ExpirationPolicy {
    /// Daemon configuration
    pub daemon: DaemonConfig,

    /// Continuous idle time after which the daemon retires on its own
    pub idle_timeout: Duration,

    /// Short idle grace period; pressure criteria only retire a daemon
    /// that has been idle at least this long
    pub quick_idle_timeout: Duration,

    /// Free-memory floor. None means the memory criterion is disabled.
    pub min_free_memory_bytes: Option<u64>,

    /// Expected daemon version. None means no version pin.
    pub required_version: Option<String>,

    /// How often the expiration check runs
    pub check_interval: Duration,
}

impl ExpirationPolicy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let expiration = raw.expiration;

        // 0 means disabled, None means use the default floor
        let min_free_memory_bytes = expiration
            .min_free_memory_bytes
            .map(bytes_or_disabled)
            .unwrap_or(Some(DEFAULT_MIN_FREE_MEMORY_BYTES));

        Self {
            daemon: DaemonConfig::from_raw(raw.daemon),
            idle_timeout: Duration::from_secs(
                expiration
                    .idle_timeout_seconds
                    .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
            ),
            quick_idle_timeout: Duration::from_secs(
                expiration
                    .quick_idle_timeout_seconds
                    .unwrap_or(DEFAULT_QUICK_IDLE_TIMEOUT_SECS),
            ),
            min_free_memory_bytes,
            required_version: expiration.required_version,
            check_interval: Duration::from_millis(
                expiration
                    .check_interval_ms
                    .unwrap_or(DEFAULT_CHECK_INTERVAL_MS),
            ),
        }
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self {
            daemon: DaemonConfig::default(),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            quick_idle_timeout: Duration::from_secs(DEFAULT_QUICK_IDLE_TIMEOUT_SECS),
            min_free_memory_bytes: Some(DEFAULT_MIN_FREE_MEMORY_BYTES),
            required_version: None,
            check_interval: Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
}

impl DaemonConfig {
    fn from_raw(raw: crate::schema::RawDaemonConfig) -> Self {
        Self {
            socket_path: raw.socket_path.unwrap_or_else(socket_path_without_env),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: socket_path_without_env(),
        }
    }
}

/// Convert bytes to a floor, treating 0 as "disabled" (None)
fn bytes_or_disabled(bytes: u64) -> Option<u64> {
    if bytes == 0 { None } else { Some(bytes) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDaemonConfig, RawExpirationConfig};

    #[test]
    fn defaults_applied_for_omitted_fields() {
        let raw = RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
            expiration: RawExpirationConfig::default(),
        };

        let policy = ExpirationPolicy::from_raw(raw);
        assert_eq!(
            policy.idle_timeout,
            Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)
        );
        assert_eq!(
            policy.min_free_memory_bytes,
            Some(DEFAULT_MIN_FREE_MEMORY_BYTES)
        );
        assert!(policy.required_version.is_none());
    }

    #[test]
    fn zero_memory_floor_disables_criterion() {
        let raw = RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
            expiration: RawExpirationConfig {
                min_free_memory_bytes: Some(0),
                ..Default::default()
            },
        };

        let policy = ExpirationPolicy::from_raw(raw);
        assert!(policy.min_free_memory_bytes.is_none());
    }

    #[test]
    fn explicit_values_preserved() {
        let raw = RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
            expiration: RawExpirationConfig {
                idle_timeout_seconds: Some(600),
                quick_idle_timeout_seconds: Some(5),
                min_free_memory_bytes: Some(1024),
                required_version: Some("2.0.0".into()),
                check_interval_ms: Some(250),
            },
        };

        let policy = ExpirationPolicy::from_raw(raw);
        assert_eq!(policy.idle_timeout, Duration::from_secs(600));
        assert_eq!(policy.quick_idle_timeout, Duration::from_secs(5));
        assert_eq!(policy.min_free_memory_bytes, Some(1024));
        assert_eq!(policy.required_version.as_deref(), Some("2.0.0"));
        assert_eq!(policy.check_interval, Duration::from_millis(250));
    }
}
