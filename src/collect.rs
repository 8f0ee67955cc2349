//! Live state collection from the lab routers.
//!
//! The routing table and the OSPF neighbor table of each router are captured
//! as raw `vtysh` text and stored in a JSON snapshot:
//!
//! ```json
//! {
//!   "clab-netauto-r1": { "routes": "...", "ospf": "..." }
//! }
//! ```
//!
//! Collection never aborts the batch. A command that fails to run or times
//! out leaves an empty string for that blob and a warning in the log.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionFactory, ExecuteOptions};
use crate::error::Result;

/// Default routing table command.
pub const ROUTES_COMMAND: &str = "vtysh -c 'show ip route'";
/// Default OSPF neighbor table command.
pub const NEIGHBORS_COMMAND: &str = "vtysh -c 'show ip ospf neighbor'";
/// Default per-command timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

/// Raw device output of one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    /// `show ip route` output
    pub routes: String,
    /// `show ip ospf neighbor` output
    pub ospf: String,
}

/// Point-in-time capture of device state, keyed by host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    hosts: IndexMap<String, HostState>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the state of `host`.
    pub fn insert(&mut self, host: impl Into<String>, state: HostState) {
        self.hosts.insert(host.into(), state);
    }

    /// State of `host`.
    pub fn get(&self, host: &str) -> Option<&HostState> {
        self.hosts.get(host)
    }

    /// Iterate hosts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HostState)> {
        self.hosts.iter()
    }

    /// Number of hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// True when no host was captured.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.hosts)?)
    }

    /// Parse a snapshot leniently.
    ///
    /// Missing, `null` or non-string blobs read as empty text. A document that
    /// is not a JSON object yields an empty snapshot.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            warn!("snapshot is not a JSON object, ignoring it");
            return Ok(Self::new());
        }

        // Re-read into an ordered map to keep the document's host order.
        let map: IndexMap<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut snapshot = Self::new();
        for (host, payload) in map {
            let field = |name: &str| {
                payload
                    .get(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            let state = HostState {
                routes: field("routes"),
                ospf: field("ospf"),
            };
            snapshot.insert(host, state);
        }
        Ok(snapshot)
    }

    /// Write the snapshot, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), hosts = self.len(), "saved snapshot");
        Ok(())
    }

    /// Load a snapshot; absent or malformed files read as empty.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot, using empty");
                return Self::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, using empty");
                return Self::new();
            }
        };
        match Self::from_json(&text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed snapshot, using empty");
                Self::new()
            }
        }
    }
}

/// Commands and limits of a collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectConfig {
    /// Routing table command
    pub routes_command: String,
    /// OSPF neighbor table command
    pub neighbors_command: String,
    /// Upper bound per command, in seconds
    pub timeout_secs: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            routes_command: ROUTES_COMMAND.to_string(),
            neighbors_command: NEIGHBORS_COMMAND.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Gathers device state host by host.
#[derive(Debug, Clone, Default)]
pub struct StateCollector {
    config: CollectConfig,
}

impl StateCollector {
    /// Create a collector.
    pub fn new(config: CollectConfig) -> Self {
        Self { config }
    }

    /// Collect every host in order.
    pub async fn collect(&self, hosts: &[String], factory: &dyn ConnectionFactory) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for host in hosts {
            let conn = factory.connect(host);
            let state = self.collect_host(host, conn.as_ref()).await;
            snapshot.insert(host.clone(), state);
        }
        snapshot
    }

    /// Collect one host.
    pub async fn collect_host(&self, host: &str, conn: &dyn Connection) -> HostState {
        debug!(host = %host, container = %conn.identifier(), "collecting state");
        HostState {
            routes: self.capture(host, conn, &self.config.routes_command).await,
            ospf: self.capture(host, conn, &self.config.neighbors_command).await,
        }
    }

    async fn capture(&self, host: &str, conn: &dyn Connection, command: &str) -> String {
        let options = ExecuteOptions::new().with_timeout(self.config.timeout_secs);
        match conn.execute(command, Some(options)).await {
            Ok(result) => {
                if !result.success {
                    debug!(
                        host = %host,
                        command = %command,
                        exit_code = result.exit_code,
                        "command exited non-zero"
                    );
                }
                result.stdout
            }
            Err(e) => {
                warn!(host = %host, command = %command, error = %e, "collection failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_json_layout() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "r1",
            HostState {
                routes: "O>* 10.0.2.0/24".into(),
                ospf: String::new(),
            },
        );
        assert_eq!(
            snapshot.to_json().unwrap(),
            "{\n  \"r1\": {\n    \"routes\": \"O>* 10.0.2.0/24\",\n    \"ospf\": \"\"\n  }\n}"
        );
    }

    #[test]
    fn test_lenient_parse() {
        let snapshot =
            Snapshot::from_json(r#"{"r1": null, "r2": {"routes": null, "ospf": "x"}}"#).unwrap();
        assert_eq!(snapshot.get("r1"), Some(&HostState::default()));
        assert_eq!(snapshot.get("r2").unwrap().ospf, "x");
        assert!(Snapshot::from_json("[1, 2]").unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("routes.json");
        let mut snapshot = Snapshot::new();
        snapshot.insert("r2", HostState::default());
        snapshot.insert("r1", HostState::default());
        snapshot.save(&path).unwrap();

        let loaded = Snapshot::load(&path);
        assert_eq!(loaded, snapshot);
        let order: Vec<_> = loaded.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(order, vec!["r2", "r1"]);
    }

    #[test]
    fn test_load_missing_or_malformed() {
        let dir = TempDir::new().unwrap();
        assert!(Snapshot::load(&dir.path().join("none.json")).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(Snapshot::load(&bad).is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn load_with_logs(path: &Path) -> (Snapshot, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let snapshot = tracing::subscriber::with_default(subscriber, || Snapshot::load(path));
        let logs = String::from_utf8_lossy(&buffer.0.lock()).to_string();
        (snapshot, logs)
    }

    #[test]
    fn test_unreadable_snapshot_warns() {
        let dir = TempDir::new().unwrap();

        let binary = dir.path().join("routes.json");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
        let (snapshot, logs) = load_with_logs(&binary);
        assert!(snapshot.is_empty());
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("unreadable snapshot"));

        let (snapshot, logs) = load_with_logs(&dir.path().join("absent.json"));
        assert!(snapshot.is_empty());
        assert!(!logs.contains("WARN"), "{}", logs);
    }
}
