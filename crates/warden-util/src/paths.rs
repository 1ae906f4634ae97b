//! Default paths for wardend components
//!
//! Provides centralized path defaults that all crates can use.
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/wardend/wardend.sock` or `/tmp/wardend-$USER/wardend.sock`
//! - Config: `$XDG_CONFIG_HOME/wardend/config.toml` or `~/.config/wardend/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const WARDEN_SOCKET_ENV: &str = "WARDEN_SOCKET";

/// Socket filename within the socket directory
const SOCKET_FILENAME: &str = "wardend.sock";

/// Application subdirectory name
const APP_DIR: &str = "wardend";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$WARDEN_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/wardend/wardend.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/wardend-$USER/wardend.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    // Check environment override first
    if let Ok(path) = std::env::var(WARDEN_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking WARDEN_SOCKET env var.
/// Used for default values in configs where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    // Try XDG_RUNTIME_DIR first (typically /run/user/<uid>)
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    // Fallback to /tmp with username
    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/wardend/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/wardend/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    // Last resort
    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}
