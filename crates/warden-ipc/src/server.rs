//! IPC server implementation

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};
use warden_api::{Command, ErrorCode, ErrorInfo, Event, Request, Response, ResponsePayload};
use warden_util::ClientId;

use crate::{IpcError, IpcResult};

/// A client request forwarded to the daemon loop. The loop answers through
/// the `reply` channel; dropping it closes the client's request.
pub struct ClientRequest {
    pub client_id: ClientId,
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// IPC server
pub struct IpcServer {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    event_tx: broadcast::Sender<Event>,
}

impl IpcServer {
    /// Create a new IPC server
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            listener: None,
            event_tx,
        }
    }

    /// Start listening
    pub async fn start(&mut self) -> IpcResult<()> {
        // Remove existing socket if present
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        // Create parent directory if needed
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;

        // Owner-only: the control socket can stop the daemon
        std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(0o600))?;

        info!(path = %self.socket_path.display(), "IPC server listening");

        self.listener = Some(listener);

        Ok(())
    }

    /// Accept connections in a loop, forwarding requests to `requests`
    pub async fn run(&self, requests: mpsc::UnboundedSender<ClientRequest>) -> IpcResult<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| IpcError::ServerError("Server not started".into()))?;

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let client_id = ClientId::new();
                    info!(client_id = %client_id, "Client connected");

                    let requests = requests.clone();
                    let event_tx = self.event_tx.clone();
                    tokio::spawn(async move {
                        handle_client(stream, client_id, requests, event_tx).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Broadcast an event to all subscribed clients
    pub fn broadcast_event(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_client(
    stream: UnixStream,
    client_id: ClientId,
    requests: mpsc::UnboundedSender<ClientRequest>,
    event_tx: broadcast::Sender<Event>,
) {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!(client_id = %client_id, "Client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let request: Request = match serde_json::from_str(line) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(client_id = %client_id, error = %e, "Invalid request");
                        let response = Response::error(
                            0,
                            ErrorInfo::new(ErrorCode::InvalidRequest, e.to_string()),
                        );
                        if write_json(&mut writer, &response).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                // Subscription turns this connection into an event stream
                if matches!(request.command, Command::SubscribeEvents) {
                    let response = Response::success(
                        request.request_id,
                        ResponsePayload::Subscribed {
                            client_id: client_id.clone(),
                        },
                    );
                    if write_json(&mut writer, &response).await.is_err() {
                        break;
                    }

                    stream_events(&mut writer, &client_id, event_tx.subscribe()).await;
                    break;
                }

                let (reply_tx, reply_rx) = oneshot::channel();
                let forwarded = requests.send(ClientRequest {
                    client_id: client_id.clone(),
                    request,
                    reply: reply_tx,
                });
                if forwarded.is_err() {
                    // Daemon loop is gone; nothing left to answer with
                    break;
                }

                match reply_rx.await {
                    Ok(response) => {
                        if write_json(&mut writer, &response).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "Read error");
                break;
            }
        }
    }
}

async fn stream_events(
    writer: &mut tokio::net::unix::OwnedWriteHalf,
    client_id: &ClientId,
    mut event_rx: broadcast::Receiver<Event>,
) {
    loop {
        match event_rx.recv().await {
            Ok(event) => {
                if write_json(writer, &event).await.is_err() {
                    debug!(client_id = %client_id, "Event write failed, dropping subscriber");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(client_id = %client_id, skipped, "Subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn write_json<T: serde::Serialize>(
    writer: &mut tokio::net::unix::OwnedWriteHalf,
    value: &T,
) -> IpcResult<()> {
    let mut json = serde_json::to_string(value)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_server_start() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let mut server = IpcServer::new(&socket_path);
        server.start().await.unwrap();

        assert!(socket_path.exists());
    }

    #[tokio::test]
    async fn test_run_requires_start() {
        let dir = tempdir().unwrap();
        let server = IpcServer::new(dir.path().join("test.sock"));

        let (tx, _rx) = mpsc::unbounded_channel();
        let result = server.run(tx).await;
        assert!(matches!(result, Err(IpcError::ServerError(_))));
    }

    #[tokio::test]
    async fn test_stale_socket_replaced() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");
        std::fs::write(&socket_path, b"stale").unwrap();

        let mut server = IpcServer::new(&socket_path);
        server.start().await.unwrap();

        assert!(socket_path.exists());
    }
}
