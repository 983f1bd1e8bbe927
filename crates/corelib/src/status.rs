//! Status collaborators behind VERSION, PEER and TRANSACTIONS.
//!
//! These read node-local resources that other parts of the node own: the
//! peer-identity file and the directory of stored transactions. The channel
//! and the HTTP surface only consume them.

use crate::config::CoordinatorConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Source of the answers to status queries.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// Semantic version string, verbatim.
    fn version(&self) -> &str;

    /// This node's peer identifier.
    async fn peer_id(&self) -> Result<String>;

    /// All stored transactions as one JSON array string.
    async fn transactions(&self) -> Result<String>;
}

/// Filesystem-backed status source.
#[derive(Debug, Clone)]
pub struct FsStatus {
    version: String,
    peer_id_file: PathBuf,
    graph_dir: PathBuf,
}

impl FsStatus {
    pub fn new(
        version: impl Into<String>,
        peer_id_file: impl Into<PathBuf>,
        graph_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            peer_id_file: peer_id_file.into(),
            graph_dir: graph_dir.into(),
        }
    }

    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(
            config.version.clone(),
            config.peer_id_file.clone(),
            config.graph_dir.clone(),
        )
    }
}

#[async_trait]
impl StatusSource for FsStatus {
    fn version(&self) -> &str {
        &self.version
    }

    async fn peer_id(&self) -> Result<String> {
        let path = &self.peer_id_file;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        // Opening in append mode creates the file empty without truncating it.
        tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn transactions(&self) -> Result<String> {
        let mut paths = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.graph_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(render_transactions(&[])),
            Err(e) => return Err(Error::io(&self.graph_dir, e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(&self.graph_dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::io(&path, e))?;
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&raw) {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed transaction record");
                continue;
            }
            records.push(raw.trim().to_string());
        }

        Ok(render_transactions(&records))
    }
}

/// Join pre-serialized records into the array layout served to peers.
pub fn render_transactions(records: &[String]) -> String {
    format!("[\n\t{}\n]", records.join(",\n\t"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_is_valid_json() {
        let rendered = render_transactions(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_peer_id_created_empty_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config").join("peer.id");
        let status = FsStatus::new("1.2.3", &file, dir.path().join("graph"));

        assert_eq!(status.peer_id().await.unwrap(), "");
        assert!(file.exists());

        std::fs::write(&file, "12D3KooWpeer").unwrap();
        assert_eq!(status.peer_id().await.unwrap(), "12D3KooWpeer");
    }

    #[tokio::test]
    async fn test_transactions_concatenates_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join("graph");
        std::fs::create_dir_all(&graph).unwrap();
        std::fs::write(graph.join("b.json"), "{\"tx\": 2}\n").unwrap();
        std::fs::write(graph.join("a.json"), "{\"tx\": 1}").unwrap();
        std::fs::write(graph.join("c.json"), "not json").unwrap();
        std::fs::write(graph.join("notes.txt"), "ignored").unwrap();

        let status = FsStatus::new("1.2.3", dir.path().join("peer.id"), &graph);
        let out = status.transactions().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([{"tx": 1}, {"tx": 2}]));
    }

    #[tokio::test]
    async fn test_transactions_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let status = FsStatus::new("1.2.3", dir.path().join("peer.id"), dir.path().join("none"));
        assert_eq!(status.transactions().await.unwrap(), "[\n\t\n]");
        assert_eq!(status.version(), "1.2.3");
    }
}
