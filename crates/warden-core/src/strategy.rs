//! The expiration strategy contract

use crate::{DaemonState, ExpirationVerdict};

/// A pluggable unit of expiration logic.
///
/// Implemented by leaf criteria and by the [`AllOf`](crate::AllOf) /
/// [`AnyOf`](crate::AnyOf) composites, so criteria form a tree of arbitrary
/// depth evaluated fresh on every invocation.
///
/// Contract: implementations must not mutate the daemon or other strategies,
/// and must not fail — a criterion that cannot be evaluated (a metric is
/// unavailable, say) returns the non-expiring verdict so that expiration
/// stays conservative by default.
pub trait ExpirationStrategy: Send + Sync {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict;
}
