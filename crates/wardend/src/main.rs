//! wardend - a self-retiring background worker daemon
//!
//! This is the main entry point for the wardend service.
//! It wires together all the components:
//! - Configuration loading
//! - Daemon state and the expiration supervisor
//! - IPC server (control socket)
//! - The scheduler loop that ticks the expiration check
//! - Graceful / immediate shutdown

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use warden_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, Response, ResponsePayload,
};
use warden_config::{ExpirationPolicy, load_config};
use warden_core::{DaemonState, ExpireDue, Supervisor};
use warden_ipc::{ClientRequest, IpcServer};
use warden_util::{MonotonicInstant, default_config_path};

/// How long a graceful shutdown waits for in-flight work to finish
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the drain loop re-checks for idleness
const DRAIN_POLL: Duration = Duration::from_millis(100);

/// wardend - background worker daemon with self-expiration
#[derive(Parser, Debug)]
#[command(name = "wardend")]
#[command(about = "Background worker daemon that retires itself when its expiration criteria agree", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/wardend/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set WARDEN_SOCKET env var)
    #[arg(short, long, env = "WARDEN_SOCKET")]
    socket: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    supervisor: Supervisor,
    ipc: IpcServer,
    policy: ExpirationPolicy,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        // Load configuration; a missing file means defaults
        let policy = if args.config.exists() {
            let policy = load_config(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?;
            info!(config_path = %args.config.display(), "Configuration loaded");
            policy
        } else {
            info!(
                config_path = %args.config.display(),
                "No configuration file, using defaults"
            );
            ExpirationPolicy::default()
        };

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| policy.daemon.socket_path.clone());

        // Daemon state and supervisor
        let daemon = DaemonState::new(env!("CARGO_PKG_VERSION"));
        info!(
            daemon_id = %daemon.id(),
            version = daemon.version(),
            idle_timeout = ?policy.idle_timeout,
            check_interval = ?policy.check_interval,
            "Supervisor initialized"
        );
        let supervisor = Supervisor::from_policy(daemon, &policy);

        // IPC server
        let mut ipc = IpcServer::new(&socket_path);
        ipc.start().await?;

        Ok(Self {
            supervisor,
            ipc,
            policy,
        })
    }

    async fn run(self) -> Result<()> {
        let Service {
            supervisor,
            ipc,
            policy,
        } = self;

        let supervisor = Arc::new(Mutex::new(supervisor));
        let ipc = Arc::new(ipc);

        // Spawn IPC accept task
        let (requests_tx, mut requests_rx) = mpsc::unbounded_channel();
        let ipc_accept = ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run(requests_tx).await {
                error!(error = %e, "IPC server error");
            }
        });

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        let mut tick_timer = tokio::time::interval(policy.check_interval);

        info!("Daemon running");

        // Main event loop: runs until the expiration decision fires
        let decision = loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, requesting graceful stop");
                    supervisor
                        .lock()
                        .await
                        .daemon_mut()
                        .request_stop(false, Some("SIGTERM received".into()));
                    if let Some(due) = check_expiration(&supervisor, &ipc).await {
                        break due;
                    }
                }

                _ = sigint.recv() => {
                    info!("Received SIGINT, requesting immediate stop");
                    supervisor
                        .lock()
                        .await
                        .daemon_mut()
                        .request_stop(true, Some("SIGINT received".into()));
                    if let Some(due) = check_expiration(&supervisor, &ipc).await {
                        break due;
                    }
                }

                // Tick timer - the scheduled expiration check
                _ = tick_timer.tick() => {
                    if let Some(due) = check_expiration(&supervisor, &ipc).await {
                        break due;
                    }
                }

                // Control socket requests
                Some(msg) = requests_rx.recv() => {
                    handle_client_request(&supervisor, &ipc, msg).await;
                    if let Some(due) = check_expiration(&supervisor, &ipc).await {
                        break due;
                    }
                }
            }
        };

        // Graceful drain: wait for in-flight work, bounded
        if !decision.immediate {
            let deadline = MonotonicInstant::now() + DRAIN_TIMEOUT;
            loop {
                let busy = supervisor.lock().await.daemon().is_busy();
                if !busy {
                    break;
                }
                if MonotonicInstant::now() >= deadline {
                    warn!("Drain timeout reached with work still in flight");
                    break;
                }
                tokio::time::sleep(DRAIN_POLL).await;
            }
        }

        {
            let mut supervisor = supervisor.lock().await;
            supervisor.daemon_mut().mark_terminated();
            ipc.broadcast_event(Event::new(EventPayload::Shutdown {
                daemon_id: supervisor.daemon().id().clone(),
            }));
        }

        info!(
            immediate = decision.immediate,
            reason = %decision.reason,
            "Shutdown complete"
        );
        Ok(())
    }
}

/// Run one expiration check and broadcast the decision when it fires
async fn check_expiration(
    supervisor: &Arc<Mutex<Supervisor>>,
    ipc: &Arc<IpcServer>,
) -> Option<ExpireDue> {
    let (due, daemon_id) = {
        let mut supervisor = supervisor.lock().await;
        (supervisor.tick(), supervisor.daemon().id().clone())
    };

    let due = due?;
    ipc.broadcast_event(Event::new(EventPayload::ExpirationDue {
        daemon_id,
        immediate: due.immediate,
        reason: due.reason.clone(),
    }));
    Some(due)
}

async fn handle_client_request(
    supervisor: &Arc<Mutex<Supervisor>>,
    ipc: &Arc<IpcServer>,
    msg: ClientRequest,
) {
    let ClientRequest {
        client_id,
        request,
        reply,
    } = msg;
    let request_id = request.request_id;

    let response = match request.command {
        Command::Status => {
            let supervisor = supervisor.lock().await;
            Response::success(
                request_id,
                ResponsePayload::Status(supervisor.status(MonotonicInstant::now())),
            )
        }

        Command::Stop { immediate, reason } => {
            let mut supervisor = supervisor.lock().await;
            if supervisor.is_expiring() {
                Response::error(
                    request_id,
                    ErrorInfo::new(ErrorCode::AlreadyStopping, "daemon is already stopping"),
                )
            } else {
                supervisor.daemon_mut().request_stop(immediate, reason);
                info!(client_id = %client_id, immediate, "Stop requested over control socket");
                Response::success(request_id, ResponsePayload::Stopping { immediate })
            }
        }

        Command::Touch => {
            let mut supervisor = supervisor.lock().await;
            supervisor.daemon_mut().touch(MonotonicInstant::now());
            ipc.broadcast_event(Event::new(EventPayload::Touched {
                daemon_id: supervisor.daemon().id().clone(),
            }));
            Response::success(request_id, ResponsePayload::Touched)
        }

        Command::Ping => Response::success(request_id, ResponsePayload::Pong),

        // Subscription never reaches the daemon loop
        Command::SubscribeEvents => Response::error(
            request_id,
            ErrorInfo::new(
                ErrorCode::InvalidRequest,
                "subscription is handled by the transport",
            ),
        ),
    };

    let _ = reply.send(response);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let service = Service::new(&args).await?;
    service.run().await
}
