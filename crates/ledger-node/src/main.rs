//! Entry point for a single peer process in the five-peer Paxos bank
//! ledger. Binds this peer's derived listen port, loads (or creates) its
//! durable record, and runs the operator REPL alongside the consensus
//! engine until interrupted.

mod cli;
mod commands;
mod config;
mod error;
mod peer_actor;

use anyhow::Context;
use cli::Cli;
use commands::parse_line;
use config::NodeConfig;
use error::NodeError;
use ledger_storage::Store;
use peer_actor::{ActorEvent, PeerActor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let config = NodeConfig::from_cli(&cli).context("invalid configuration")?;

    let filter = match &config.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(peer = config.id, data_dir = %config.data_dir.display(), "starting peer");

    let store = Store::new(&config.data_dir, config.id);
    let actor = PeerActor::load(config.id, store, config.debug).map_err(NodeError::Storage)?;

    let listener = ledger_network::Listener::bind(config.id)
        .await
        .map_err(|err| NodeError::Bind(std::io::Error::new(std::io::ErrorKind::Other, err.to_string())))?;

    let (tx, rx) = mpsc::channel(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let net_tx = tx.clone();
    let wire_task = tokio::spawn(async move {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(256);
        let listener_task = tokio::spawn(listener.run(inbound_tx, shutdown_rx, config.simulated_delay));
        while let Some(message) = inbound_rx.recv().await {
            if net_tx.send(ActorEvent::Wire(message)).await.is_err() {
                break;
            }
        }
        let _ = listener_task.await;
    });

    let repl_tx = tx.clone();
    let repl_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = parse_line(&line);
            if repl_tx.send(ActorEvent::Operator(command)).await.is_err() {
                break;
            }
        }
    });

    drop(tx);

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = ctrl_c_shutdown.send(true);
        }
    });

    actor.run(rx).await;
    wire_task.abort();
    repl_task.abort();
    Ok(())
}
