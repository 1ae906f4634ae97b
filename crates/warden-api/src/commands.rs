//! Command types for the wardend protocol

use serde::{Deserialize, Serialize};
use warden_util::ClientId;

use crate::API_VERSION;

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    AlreadyStopping,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Get the current daemon status
    Status,

    /// Request the daemon to stop
    Stop {
        /// Skip the graceful drain and exit at once
        #[serde(default)]
        immediate: bool,
        /// Requester-supplied justification
        reason: Option<String>,
    },

    /// Mark the daemon as active (resets idle tracking)
    Touch,

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    /// Ping for keepalive
    Ping,
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Status(crate::DaemonStatusInfo),
    Stopping { immediate: bool },
    Touched,
    Subscribed { client_id: ClientId },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = Request::new(1, Command::Status);
        let json = serde_json::to_string(&req).unwrap();
        let parsed: Request = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(parsed.command, Command::Status));
    }

    #[test]
    fn stop_defaults_to_graceful() {
        let json = r#"{"request_id":2,"api_version":1,"command":{"type":"stop","reason":null}}"#;
        let parsed: Request = serde_json::from_str(json).unwrap();

        match parsed.command {
            Command::Stop { immediate, reason } => {
                assert!(!immediate);
                assert!(reason.is_none());
            }
            other => panic!("Expected Stop, got {:?}", other),
        }
    }

    #[test]
    fn response_serialization() {
        let resp = Response::success(1, ResponsePayload::Stopping { immediate: true });

        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(
            parsed.result,
            ResponseResult::Ok(ResponsePayload::Stopping { immediate: true })
        ));
    }

    #[test]
    fn error_response() {
        let resp = Response::error(7, ErrorInfo::new(ErrorCode::InvalidRequest, "bad line"));
        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        match parsed.result {
            ResponseResult::Err(e) => assert_eq!(e.code, ErrorCode::InvalidRequest),
            _ => panic!("Expected error result"),
        }
    }
}
