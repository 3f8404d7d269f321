//! CLI argument parsing for the ledger node binary.

use clap::Parser;
use std::path::PathBuf;

/// A single peer process in the five-peer Paxos bank ledger.
#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "A peer in the five-peer Paxos bank ledger")]
#[command(version)]
pub struct Cli {
    /// This peer's id, in 1..=5. Determines its listen port and its
    /// default data directory.
    #[arg(long)]
    pub id: u8,

    /// Directory holding this peer's durable record. Defaults to
    /// `./data/peer-<id>` when not given.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Takes precedence over
    /// `RUST_LOG` when both are set.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable debug mode: responds to `DEBUG` probes and accepts the
    /// `debugMessage` operator command.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Simulated per-message delay, in milliseconds, applied before an
    /// inbound frame is handed to the consensus engine. Disabled by
    /// default; only meant for stress-testing message reordering.
    #[arg(long)]
    pub simulated_delay_ms: Option<u64>,
}

impl Cli {
    /// Parse CLI arguments from the process environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The data directory to use, applying the per-id default when the
    /// operator didn't override it.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("./data/peer-{}", self.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_data_dir_from_id() {
        let cli = Cli::parse_from(["ledger-node", "--id", "3"]);
        assert_eq!(cli.id, 3);
        assert!(cli.data_dir.is_none());
        assert_eq!(cli.resolved_data_dir(), PathBuf::from("./data/peer-3"));
        assert!(!cli.debug);
        assert!(cli.simulated_delay_ms.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn explicit_data_dir_overrides_the_default() {
        let cli = Cli::parse_from(["ledger-node", "--id", "1", "--data-dir", "/tmp/p1"]);
        assert_eq!(cli.resolved_data_dir(), PathBuf::from("/tmp/p1"));
    }

    #[test]
    fn custom_values_parse() {
        let cli = Cli::parse_from([
            "ledger-node",
            "--id",
            "2",
            "--log-level",
            "debug",
            "--debug",
            "--simulated-delay-ms",
            "3000",
        ]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(cli.debug);
        assert_eq!(cli.simulated_delay_ms, Some(3000));
    }
}
