//! Coordinator configuration.
//!
//! Built once at startup and handed to the acceptor, the ledger and the
//! status collaborators. Nothing in the workspace reads process-wide state.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_PORT: u16 = 4200;
pub const DEFAULT_P2P_PORT: u16 = 4201;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Port for the HTTP status surface and the peer channel.
    pub api_port: u16,
    /// Port reserved for peer-to-peer traffic.
    pub p2p_port: u16,
    /// The channel and status surface only run in coordinator mode.
    pub coordinator: bool,
    pub https: bool,
    pub show_ip: bool,
    pub config_dir: PathBuf,
    /// Directory holding one `<peer key>.pubkey` file per joined peer.
    pub attestation_dir: PathBuf,
    /// Text file holding this node's own peer identifier.
    pub peer_id_file: PathBuf,
    /// Directory of stored transaction records (`*.json`).
    pub graph_dir: PathBuf,
    /// Idle limit for a single receive on a channel. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Semantic version reported by VERSION and `/version`.
    pub version: String,
}

impl CoordinatorConfig {
    /// Defaults rooted at `config_dir`, with every derived path beneath it.
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            api_port: DEFAULT_API_PORT,
            p2p_port: DEFAULT_P2P_PORT,
            coordinator: false,
            https: false,
            show_ip: false,
            attestation_dir: config_dir.join("p2p"),
            peer_id_file: config_dir.join("peer.id"),
            graph_dir: PathBuf::from("graph"),
            config_dir,
            read_timeout: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn identity_key_path(&self) -> PathBuf {
        self.config_dir.join(crate::identity::IDENTITY_KEY_FILE)
    }

    pub fn attestation_dir(&self) -> &Path {
        &self.attestation_dir
    }

    /// Reject combinations that cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.api_port == self.p2p_port {
            return Err(Error::Config(format!(
                "api port and p2p port must differ (both {})",
                self.api_port
            )));
        }
        if self.read_timeout == Some(Duration::ZERO) {
            return Err(Error::Config("read timeout must be non-zero".into()));
        }
        if self.version.is_empty() {
            return Err(Error::Config("version string must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::with_config_dir("config")
    }
}
