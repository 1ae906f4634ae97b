//! Version pin criterion

use crate::{DaemonState, ExpirationStrategy, ExpirationVerdict};

/// Expires a daemon whose recorded version differs from the required one,
/// so stale daemons drain away after an upgrade.
pub struct VersionMismatch {
    required: String,
}

impl VersionMismatch {
    pub fn new(required: impl Into<String>) -> Self {
        Self {
            required: required.into(),
        }
    }
}

impl ExpirationStrategy for VersionMismatch {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict {
        if daemon.version() == self.required {
            return ExpirationVerdict::not_expired();
        }

        ExpirationVerdict::expire(
            false,
            false,
            Some(format!(
                "daemon version {} does not match required version {}",
                daemon.version(),
                self.required
            )),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_version_survives() {
        let daemon = DaemonState::new("1.2.3");
        let strategy = VersionMismatch::new("1.2.3");

        assert!(!strategy.check_expiration(&daemon).is_expired());
    }

    #[test]
    fn mismatched_version_expires() {
        let daemon = DaemonState::new("1.2.3");
        let strategy = VersionMismatch::new("2.0.0");

        let verdict = strategy.check_expiration(&daemon);
        assert!(verdict.is_expired());
        assert_eq!(
            verdict.reason(),
            Some("daemon version 1.2.3 does not match required version 2.0.0")
        );
    }
}
