//! wardenctl - control CLI for wardend
//!
//! Talks to a running wardend over its Unix control socket: query status,
//! request a stop, reset the idle clock, or stream events.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use warden_api::{
    Command as DaemonCommand, DaemonStatusInfo, Event, EventPayload, Response, ResponsePayload,
    ResponseResult,
};
use warden_ipc::IpcClient;
use warden_util::{default_socket_path, format_duration};

/// wardenctl - control a running wardend
#[derive(Parser, Debug)]
#[command(name = "wardenctl")]
#[command(about = "Control CLI for wardend", long_about = None)]
struct Args {
    /// Socket path (or set WARDEN_SOCKET env var)
    #[arg(short, long, env = "WARDEN_SOCKET", default_value_os_t = default_socket_path())]
    socket: PathBuf,

    #[command(subcommand)]
    command: CtlCommand,
}

#[derive(Subcommand, Debug)]
enum CtlCommand {
    /// Show daemon status
    Status,

    /// Ask the daemon to stop
    Stop {
        /// Skip the graceful drain and stop at once
        #[arg(long)]
        now: bool,

        /// Justification recorded with the stop
        #[arg(long)]
        reason: Option<String>,
    },

    /// Mark the daemon as active (resets its idle clock)
    Touch,

    /// Stream daemon events until it shuts down
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = IpcClient::connect(&args.socket).await.with_context(|| {
        format!(
            "Failed to connect to wardend at {} (is it running?)",
            args.socket.display()
        )
    })?;

    match args.command {
        CtlCommand::Status => {
            let mut client = client;
            let response = client.send(DaemonCommand::Status).await?;
            match expect_ok(response)? {
                ResponsePayload::Status(status) => print_status(&status),
                other => bail!("Unexpected response: {:?}", other),
            }
        }

        CtlCommand::Stop { now, reason } => {
            let mut client = client;
            let response = client
                .send(DaemonCommand::Stop {
                    immediate: now,
                    reason,
                })
                .await?;
            match expect_ok(response)? {
                ResponsePayload::Stopping { immediate } => {
                    if immediate {
                        println!("Stopping immediately");
                    } else {
                        println!("Stopping after drain");
                    }
                }
                other => bail!("Unexpected response: {:?}", other),
            }
        }

        CtlCommand::Touch => {
            let mut client = client;
            let response = client.send(DaemonCommand::Touch).await?;
            match expect_ok(response)? {
                ResponsePayload::Touched => println!("Idle clock reset"),
                other => bail!("Unexpected response: {:?}", other),
            }
        }

        CtlCommand::Watch => {
            let mut events = client.subscribe().await?;
            loop {
                let event = events.next().await?;
                print_event(&event);
                if matches!(event.payload, EventPayload::Shutdown { .. }) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn expect_ok(response: Response) -> Result<ResponsePayload> {
    match response.result {
        ResponseResult::Ok(payload) => Ok(payload),
        ResponseResult::Err(e) => bail!("wardend error ({:?}): {}", e.code, e.message),
    }
}

fn print_status(status: &DaemonStatusInfo) {
    println!("Daemon:     {}", status.daemon_id);
    println!("Version:    {}", status.version);
    println!(
        "Started:    {} (up {})",
        status.started_at.format("%Y-%m-%d %H:%M:%S"),
        format_duration(status.uptime)
    );
    match status.idle_for {
        Some(idle) => println!("Activity:   idle for {}", format_duration(idle)),
        None => println!("Activity:   busy"),
    }
    if status.stop_requested {
        println!("Stop:       requested");
    }
    match &status.expire_reason {
        Some(reason) => println!("Expiring:   yes ({})", reason),
        None => println!("Expiring:   no"),
    }
}

fn print_event(event: &Event) {
    let timestamp = event.timestamp.format("%H:%M:%S");
    match &event.payload {
        EventPayload::ExpirationDue {
            immediate, reason, ..
        } => {
            let mode = if *immediate { "immediate" } else { "graceful" };
            println!("{} expiration due ({}): {}", timestamp, mode, reason);
        }
        EventPayload::Touched { .. } => println!("{} idle clock reset", timestamp),
        EventPayload::Shutdown { .. } => println!("{} daemon shut down", timestamp),
    }
}
