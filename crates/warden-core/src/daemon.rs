//! Daemon state evaluated by the expiration criteria

use chrono::{DateTime, Local};
use std::time::Duration;
use warden_util::{DaemonId, MonotonicInstant};

/// What the daemon is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Actively working; idle tracking is suspended
    Busy,
    /// Waiting for work since the given instant
    Idle { since: MonotonicInstant },
}

/// An explicit request to stop the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRequest {
    /// Skip the graceful drain
    pub immediate: bool,
    /// Requester-supplied justification
    pub reason: Option<String>,
}

/// Runtime state of the supervised daemon.
///
/// Mutation goes through the owner; expiration strategies only ever see
/// `&DaemonState` and must not change it.
#[derive(Debug)]
pub struct DaemonState {
    id: DaemonId,
    version: String,
    started_at: MonotonicInstant,
    started_at_wall: DateTime<Local>,
    activity: Activity,
    stop_request: Option<StopRequest>,
    terminated: bool,
}

impl DaemonState {
    /// Create state for a freshly started daemon. It begins idle.
    pub fn new(version: impl Into<String>) -> Self {
        let now = MonotonicInstant::now();
        Self {
            id: DaemonId::new(),
            version: version.into(),
            started_at: now,
            started_at_wall: Local::now(),
            activity: Activity::Idle { since: now },
            stop_request: None,
            terminated: false,
        }
    }

    pub fn id(&self) -> &DaemonId {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn started_at_wall(&self) -> DateTime<Local> {
        self.started_at_wall
    }

    pub fn uptime(&self, now: MonotonicInstant) -> Duration {
        now.duration_since(self.started_at)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.activity, Activity::Busy)
    }

    /// How long the daemon has been continuously idle. None while busy.
    pub fn idle_duration(&self, now: MonotonicInstant) -> Option<Duration> {
        match self.activity {
            Activity::Busy => None,
            Activity::Idle { since } => Some(now.duration_since(since)),
        }
    }

    /// Record that work started
    pub fn mark_busy(&mut self) {
        self.activity = Activity::Busy;
    }

    /// Record that work finished; idle tracking restarts from `now`
    pub fn mark_idle(&mut self, now: MonotonicInstant) {
        self.activity = Activity::Idle { since: now };
    }

    /// Record an activity pulse: a busy daemon stays busy, an idle daemon's
    /// idle clock restarts from `now`.
    pub fn touch(&mut self, now: MonotonicInstant) {
        if let Activity::Idle { .. } = self.activity {
            self.activity = Activity::Idle { since: now };
        }
    }

    /// Register a stop request. The first request wins, except that an
    /// immediate request upgrades a pending graceful one. Returns whether
    /// anything changed.
    pub fn request_stop(&mut self, immediate: bool, reason: Option<String>) -> bool {
        match &mut self.stop_request {
            None => {
                self.stop_request = Some(StopRequest { immediate, reason });
                true
            }
            Some(existing) if immediate && !existing.immediate => {
                existing.immediate = true;
                true
            }
            Some(_) => false,
        }
    }

    pub fn stop_request(&self) -> Option<&StopRequest> {
        self.stop_request.as_ref()
    }

    /// Record that the daemon considers itself ended (its work loop has
    /// wound down), as opposed to merely eligible for shutdown.
    pub fn mark_terminated(&mut self) {
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}
