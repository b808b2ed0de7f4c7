use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use ghost_commands::{CommandResponse, execute, parse_command_line};
use ghost_core::Relay;

/// Read operator commands from stdin until it closes.
///
/// Stdin is read on a plain thread so that a pending read never holds up
/// runtime shutdown.
pub async fn run(relay: Arc<Relay>) {
    let mut lines = spawn_stdin_reader();
    info!("Control surface ready; type `help` for commands.");

    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command_line(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("{err:#}");
                continue;
            }
        };

        match execute(&relay, command).await {
            Ok(CommandResponse::Done) => {}
            Ok(CommandResponse::Messages(payload)) => match serde_json::to_string(&payload) {
                Ok(json) => println!("{json}"),
                Err(err) => error!(?err, "failed to encode fetched messages"),
            },
            Ok(CommandResponse::Help(text)) => println!("{text}"),
            Err(err) => error!(?err, "control command failed"),
        }
    }

    info!("Control input closed; waiting for shutdown signal.");
    std::future::pending::<()>().await;
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if lines_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(?err, "failed to read control input");
                    break;
                }
            }
        }
    });

    lines_rx
}
