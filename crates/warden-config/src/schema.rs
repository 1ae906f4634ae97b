//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Expiration criteria settings
    #[serde(default)]
    pub expiration: RawExpirationConfig,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Control socket path (default: $XDG_RUNTIME_DIR/wardend/wardend.sock)
    pub socket_path: Option<PathBuf>,
}

/// Expiration criteria settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawExpirationConfig {
    /// Continuous idle time after which the daemon retires, in seconds
    pub idle_timeout_seconds: Option<u64>,

    /// Short idle grace period used by the pressure criteria, in seconds
    pub quick_idle_timeout_seconds: Option<u64>,

    /// Free-memory floor below which an idle daemon retires.
    /// 0 disables the memory criterion.
    pub min_free_memory_bytes: Option<u64>,

    /// Expected daemon version; a mismatching idle daemon retires
    pub required_version: Option<String>,

    /// How often the expiration check runs, in milliseconds
    pub check_interval_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            config_version = 1

            [daemon]
            socket_path = "/run/user/1000/wardend/wardend.sock"

            [expiration]
            idle_timeout_seconds = 7200
            quick_idle_timeout_seconds = 15
            min_free_memory_bytes = 134217728
            required_version = "0.1.0"
            check_interval_ms = 5000
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.config_version, 1);
        assert_eq!(config.expiration.idle_timeout_seconds, Some(7200));
        assert_eq!(config.expiration.required_version.as_deref(), Some("0.1.0"));
        assert!(config.daemon.socket_path.is_some());
    }

    #[test]
    fn parse_minimal_config() {
        let toml_str = "config_version = 1";

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert!(config.expiration.idle_timeout_seconds.is_none());
        assert!(config.daemon.socket_path.is_none());
    }
}
