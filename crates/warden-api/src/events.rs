//! Event types for wardend -> client streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use warden_util::DaemonId;

use crate::API_VERSION;

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: Local::now(),
            payload,
        }
    }
}

/// All possible events from the daemon to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// The expiration decision fired: the daemon will stop
    ExpirationDue {
        daemon_id: DaemonId,
        immediate: bool,
        reason: String,
    },

    /// The daemon was marked active by a client or by work
    Touched {
        daemon_id: DaemonId,
    },

    /// The daemon is shutting down
    Shutdown {
        daemon_id: DaemonId,
    },
}
