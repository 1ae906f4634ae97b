//! Supervisor: owns the daemon state and the strategy tree

use crate::strategies::{
    IdleTimeout, LowMemory, MemoryProbe, StopRequested, SystemMemoryProbe, VersionMismatch,
};
use crate::{AllOf, AnyOf, DaemonState, ExpirationStrategy, ExpirationVerdict};
use std::sync::Arc;
use tracing::{debug, info};
use warden_api::DaemonStatusInfo;
use warden_config::ExpirationPolicy;
use warden_util::MonotonicInstant;

/// The latched expiration decision, emitted once by [`Supervisor::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpireDue {
    /// Skip the graceful drain
    pub immediate: bool,
    /// Every firing criterion considered the daemon already ended
    pub terminated: bool,
    /// Combined justification from the firing criteria
    pub reason: String,
}

/// Owns the daemon state and the immutable strategy tree, and turns
/// scheduled checks into at most one expiration decision.
pub struct Supervisor {
    daemon: DaemonState,
    strategy: Box<dyn ExpirationStrategy>,
    expire_due: Option<ExpireDue>,
}

impl Supervisor {
    pub fn new(daemon: DaemonState, strategy: Box<dyn ExpirationStrategy>) -> Self {
        Self {
            daemon,
            strategy,
            expire_due: None,
        }
    }

    /// Build a supervisor with the production strategy tree for `policy`
    pub fn from_policy(daemon: DaemonState, policy: &ExpirationPolicy) -> Self {
        let strategy = build_strategy_tree(policy, Arc::new(SystemMemoryProbe::new()));
        Self::new(daemon, strategy)
    }

    pub fn daemon(&self) -> &DaemonState {
        &self.daemon
    }

    pub fn daemon_mut(&mut self) -> &mut DaemonState {
        &mut self.daemon
    }

    /// Evaluate the strategy tree without changing supervisor state
    pub fn check_now(&self) -> ExpirationVerdict {
        self.strategy.check_expiration(&self.daemon)
    }

    /// Run one scheduled expiration check.
    ///
    /// Returns the decision the first time the tree votes to expire; once
    /// latched, later ticks return None so the shutdown runs exactly once.
    pub fn tick(&mut self) -> Option<ExpireDue> {
        if self.expire_due.is_some() {
            return None;
        }

        let verdict = self.strategy.check_expiration(&self.daemon);
        if !verdict.is_expired() {
            debug!(daemon_id = %self.daemon.id(), "Expiration check passed");
            return None;
        }

        let due = ExpireDue {
            immediate: verdict.is_immediate(),
            terminated: verdict.is_terminated(),
            reason: verdict.reason().unwrap_or_default().to_string(),
        };

        info!(
            daemon_id = %self.daemon.id(),
            immediate = due.immediate,
            reason = %due.reason,
            "Daemon expiration due"
        );

        self.expire_due = Some(due.clone());
        Some(due)
    }

    pub fn expire_due(&self) -> Option<&ExpireDue> {
        self.expire_due.as_ref()
    }

    pub fn is_expiring(&self) -> bool {
        self.expire_due.is_some()
    }

    /// Snapshot for the control surface
    pub fn status(&self, now: MonotonicInstant) -> DaemonStatusInfo {
        DaemonStatusInfo {
            daemon_id: self.daemon.id().clone(),
            version: self.daemon.version().to_string(),
            started_at: self.daemon.started_at_wall(),
            uptime: self.daemon.uptime(now),
            busy: self.daemon.is_busy(),
            idle_for: self.daemon.idle_duration(now),
            stop_requested: self.daemon.stop_request().is_some(),
            expiring: self.expire_due.is_some(),
            expire_reason: self.expire_due.as_ref().map(|d| d.reason.clone()),
        }
    }
}

/// Assemble the production strategy tree.
///
/// An explicit stop always wins; idling past the full timeout retires the
/// daemon on its own; memory pressure and a version pin only retire a daemon
/// that has also been idle past the short grace period, so a busy daemon is
/// never killed by a single overzealous signal.
pub fn build_strategy_tree(
    policy: &ExpirationPolicy,
    memory_probe: Arc<dyn MemoryProbe>,
) -> Box<dyn ExpirationStrategy> {
    let mut alternatives: Vec<Box<dyn ExpirationStrategy>> = vec![
        Box::new(StopRequested),
        Box::new(IdleTimeout::new(policy.idle_timeout)),
    ];

    if let Some(min_free) = policy.min_free_memory_bytes {
        alternatives.push(Box::new(AllOf::new(vec![
            Box::new(IdleTimeout::new(policy.quick_idle_timeout)),
            Box::new(LowMemory::new(memory_probe, min_free)),
        ])));
    }

    if let Some(required) = &policy.required_version {
        alternatives.push(Box::new(AllOf::new(vec![
            Box::new(IdleTimeout::new(policy.quick_idle_timeout)),
            Box::new(VersionMismatch::new(required.clone())),
        ])));
    }

    Box::new(AnyOf::new(alternatives))
}
