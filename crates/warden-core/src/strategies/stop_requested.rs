//! Explicit stop criterion

use crate::{DaemonState, ExpirationStrategy, ExpirationVerdict};

/// Expires a daemon for which a stop request has been registered.
///
/// `immediate` mirrors the request's urgency; `terminated` mirrors whether
/// the daemon has already marked itself ended.
pub struct StopRequested;

impl ExpirationStrategy for StopRequested {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict {
        let Some(request) = daemon.stop_request() else {
            return ExpirationVerdict::not_expired();
        };

        let reason = request
            .reason
            .clone()
            .unwrap_or_else(|| "stop requested".to_string());

        ExpirationVerdict::expire(request.immediate, daemon.is_terminated(), Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_request_survives() {
        let daemon = DaemonState::new("0.1.0");
        assert!(!StopRequested.check_expiration(&daemon).is_expired());
    }

    #[test]
    fn graceful_request_expires() {
        let mut daemon = DaemonState::new("0.1.0");
        daemon.request_stop(false, Some("operator asked".into()));

        let verdict = StopRequested.check_expiration(&daemon);
        assert!(verdict.is_expired());
        assert!(!verdict.is_immediate());
        assert!(!verdict.is_terminated());
        assert_eq!(verdict.reason(), Some("operator asked"));
    }

    #[test]
    fn immediate_request_expires_immediately() {
        let mut daemon = DaemonState::new("0.1.0");
        daemon.request_stop(true, None);

        let verdict = StopRequested.check_expiration(&daemon);
        assert!(verdict.is_immediate());
        assert_eq!(verdict.reason(), Some("stop requested"));
    }

    #[test]
    fn terminated_daemon_is_reported_terminated() {
        let mut daemon = DaemonState::new("0.1.0");
        daemon.request_stop(false, None);
        daemon.mark_terminated();

        let verdict = StopRequested.check_expiration(&daemon);
        assert!(verdict.is_terminated());
    }
}
