//! Config validation CLI tool
//!
//! Validates a wardend configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use warden_util::{default_config_path, format_duration};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a wardend configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    // Check file exists
    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    // Try to load and validate
    match warden_config::load_config(&config_path) {
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", warden_config::CURRENT_CONFIG_VERSION);
            println!("  Idle timeout: {}", format_duration(policy.idle_timeout));
            println!(
                "  Quick idle timeout: {}",
                format_duration(policy.quick_idle_timeout)
            );
            match policy.min_free_memory_bytes {
                Some(bytes) => println!("  Free-memory floor: {} bytes", bytes),
                None => println!("  Free-memory floor: disabled"),
            }
            match &policy.required_version {
                Some(version) => println!("  Required version: {}", version),
                None => println!("  Required version: none"),
            }
            println!(
                "  Check interval: {}ms",
                policy.check_interval.as_millis()
            );
            println!("  Socket: {}", policy.daemon.socket_path.display());

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                warden_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                warden_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                warden_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                warden_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        warden_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
