//! Enumeration of the hosts a command operates on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;

/// Routers of the default lab topology.
pub const DEFAULT_HOSTS: &[&str] = &["clab-netauto-r1", "clab-netauto-r2"];

/// Where the host list comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostSourceKind {
    /// The configured list, verbatim.
    Static,
    /// File stems of the backups directory.
    Backups,
}

impl Default for HostSourceKind {
    fn default() -> Self {
        Self::Backups
    }
}

/// A resolvable host list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    /// Fixed hosts in the given order.
    Static(Vec<String>),
    /// Sorted stems of `<dir>/*.<extension>`, or `fallback` when none exist.
    Directory {
        /// Directory to scan
        dir: PathBuf,
        /// File extension without the dot
        extension: String,
        /// Hosts used when the directory holds no matching file
        fallback: Vec<String>,
    },
}

impl HostSource {
    /// Resolve the host list.
    pub fn resolve(&self) -> Result<Vec<String>> {
        match self {
            HostSource::Static(hosts) => Ok(hosts.clone()),
            HostSource::Directory {
                dir,
                extension,
                fallback,
            } => {
                if !dir.is_dir() {
                    debug!(dir = %dir.display(), "host directory missing, using fallback");
                    return Ok(fallback.clone());
                }

                let mut hosts = Vec::new();
                for entry in std::fs::read_dir(dir)? {
                    let path = entry?.path();
                    if !path.is_file() {
                        continue;
                    }
                    if path.extension().and_then(|e| e.to_str()) != Some(extension.as_str()) {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        hosts.push(stem.to_string());
                    }
                }
                hosts.sort();

                if hosts.is_empty() {
                    debug!(dir = %dir.display(), "no backups found, using fallback");
                    Ok(fallback.clone())
                } else {
                    Ok(hosts)
                }
            }
        }
    }
}

/// The default host list as owned strings.
pub fn default_hosts() -> Vec<String> {
    DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect()
}
