//! Command-line flags.

use clap::Parser;
use corelib::config::{CoordinatorConfig, DEFAULT_API_PORT, DEFAULT_P2P_PORT};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "karai-coord", version, about = "Karai coordinator node")]
pub struct CliConfig {
    /// Port to run the coordinator API and peer channel on.
    #[arg(long = "apiport", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port to listen for P2P messages on.
    #[arg(long = "p2pport", default_value_t = DEFAULT_P2P_PORT)]
    pub p2p_port: u16,

    /// Run as coordinator.
    #[arg(long)]
    pub coordinator: bool,

    /// Use HTTPS for the API.
    #[arg(long)]
    pub https: bool,

    /// Show the listening address on startup.
    #[arg(long = "showip")]
    pub show_ip: bool,

    /// Directory holding the identity key, peer id and attestations.
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Directory holding stored transactions.
    #[arg(long, default_value = "graph")]
    pub graph_dir: PathBuf,

    /// Close a peer channel after this many idle seconds.
    #[arg(long = "read-timeout-secs")]
    pub read_timeout_secs: Option<u64>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliConfig {
    pub fn to_coordinator_config(&self) -> CoordinatorConfig {
        let mut config = CoordinatorConfig::with_config_dir(&self.config_dir);
        config.api_port = self.api_port;
        config.p2p_port = self.p2p_port;
        config.coordinator = self.coordinator;
        config.https = self.https;
        config.show_ip = self.show_ip;
        config.graph_dir = self.graph_dir.clone();
        config.read_timeout = self.read_timeout_secs.map(Duration::from_secs);
        config.version = env!("CARGO_PKG_VERSION").to_string();
        config
    }

    /// Parse-time entry: set up logging and run the node to completion.
    pub fn run(&self) -> anyhow::Result<()> {
        crate::node::init_tracing(self.verbose);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(crate::node::run(self.to_coordinator_config()))
    }
}
