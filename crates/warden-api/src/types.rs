//! Shared types for the wardend API

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_util::DaemonId;

/// Point-in-time view of the daemon for the control surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatusInfo {
    pub daemon_id: DaemonId,

    /// Version the daemon was built as
    pub version: String,

    /// Wall-clock start time (for display)
    pub started_at: DateTime<Local>,

    /// Time since the daemon started
    pub uptime: Duration,

    /// Whether the daemon is currently doing work
    pub busy: bool,

    /// How long the daemon has been continuously idle. None while busy.
    pub idle_for: Option<Duration>,

    /// Whether a stop request has been registered
    pub stop_requested: bool,

    /// Whether the expiration decision has fired
    pub expiring: bool,

    /// Justification for the expiration decision, once it has fired
    pub expire_reason: Option<String>,
}
