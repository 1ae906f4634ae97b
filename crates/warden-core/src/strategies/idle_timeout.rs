//! Idle timeout criterion

use crate::{DaemonState, ExpirationStrategy, ExpirationVerdict};
use std::time::Duration;
use warden_util::{MonotonicInstant, format_duration};

/// Expires a daemon that has been continuously idle for at least `timeout`.
/// A busy daemon never expires through this criterion.
pub struct IdleTimeout {
    timeout: Duration,
}

impl IdleTimeout {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ExpirationStrategy for IdleTimeout {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict {
        let now = MonotonicInstant::now();

        match daemon.idle_duration(now) {
            Some(idle) if idle >= self.timeout => ExpirationVerdict::expire(
                false,
                false,
                Some(format!("daemon has been idle for {}", format_duration(idle))),
            ),
            _ => ExpirationVerdict::not_expired(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_daemon_past_timeout_expires() {
        let daemon = DaemonState::new("0.1.0");
        let strategy = IdleTimeout::new(Duration::ZERO);

        let verdict = strategy.check_expiration(&daemon);
        assert!(verdict.is_expired());
        assert!(!verdict.is_immediate());
        assert!(!verdict.is_terminated());
        assert!(verdict.reason().unwrap().starts_with("daemon has been idle for"));
    }

    #[test]
    fn idle_daemon_within_timeout_survives() {
        let daemon = DaemonState::new("0.1.0");
        let strategy = IdleTimeout::new(Duration::from_secs(3600));

        assert!(!strategy.check_expiration(&daemon).is_expired());
    }

    #[test]
    fn busy_daemon_never_expires() {
        let mut daemon = DaemonState::new("0.1.0");
        daemon.mark_busy();
        let strategy = IdleTimeout::new(Duration::ZERO);

        assert!(!strategy.check_expiration(&daemon).is_expired());
    }
}
