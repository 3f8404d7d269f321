//! Runtime configuration for a peer process, assembled from [`crate::cli::Cli`].

use crate::cli::Cli;
use crate::error::NodeError;
use ledger_consensus::PeerId;
use std::path::PathBuf;
use std::time::Duration;

/// The resolved configuration a running peer is built from. Separate from
/// [`Cli`] so that validation (id range) happens once, at startup, rather
/// than being re-checked by every consumer.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This peer's id.
    pub id: PeerId,
    /// Directory the durable record lives in.
    pub data_dir: PathBuf,
    /// Log level, when the operator gave one explicitly on the CLI.
    pub log_level: Option<String>,
    /// Whether debug-mode echo handling and verbose tracing are enabled.
    pub debug: bool,
    /// Fixed delay applied before handling each inbound frame, if any.
    pub simulated_delay: Option<Duration>,
}

impl NodeConfig {
    /// Validate and resolve a [`Cli`] into a [`NodeConfig`].
    pub fn from_cli(cli: &Cli) -> Result<Self, NodeError> {
        if !(1..=ledger_consensus::PEER_COUNT).contains(&cli.id) {
            return Err(NodeError::InvalidPeerId(cli.id));
        }
        Ok(NodeConfig {
            id: cli.id,
            data_dir: cli.resolved_data_dir(),
            log_level: cli.log_level.clone(),
            debug: cli.debug,
            simulated_delay: cli.simulated_delay_ms.map(Duration::from_millis),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn valid_id_resolves_cleanly() {
        let cli = Cli::parse_from(["ledger-node", "--id", "4"]);
        let config = NodeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.id, 4);
        assert_eq!(config.data_dir, PathBuf::from("./data/peer-4"));
        assert!(!config.debug);
        assert!(config.simulated_delay.is_none());
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let cli = Cli::parse_from(["ledger-node", "--id", "9"]);
        let err = NodeConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, NodeError::InvalidPeerId(9)));
    }

    #[test]
    fn simulated_delay_is_converted_to_a_duration() {
        let cli = Cli::parse_from(["ledger-node", "--id", "1", "--simulated-delay-ms", "3000"]);
        let config = NodeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.simulated_delay, Some(Duration::from_secs(3)));
    }
}
