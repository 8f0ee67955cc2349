//! # Netauto - Lab Validation for FRR/OSPF Networks
//!
//! Netauto validates a small containerlab network of FRR routers. It renders
//! the intended router configuration from a Jinja2 template, compares it with
//! the backed-up running configuration, collects live routing state from the
//! routers and keeps a Markdown health report up to date.
//!
//! ## Core Concepts
//!
//! - **Drift**: divergence between intended (rendered) and actual (backup) configuration
//! - **Section**: the `router ospf` block, the default comparison scope
//! - **Snapshot**: raw `vtysh` output of every router at one point in time
//! - **Report**: a summary block (replaced on every run) over per-host detail
//! - **Probe**: a retried health check executed inside a lab container
//!
//! ## Architecture Overview
//!
//! ```text
//!  group/host vars ─┐
//!                   ▼
//!  template ──► TemplateRenderer ──► extract_ospf ──► normalize ──┐
//!                                                                 ▼
//!  backups ─────────────────────────► extract_ospf ──► normalize ──► DriftChecker ──► artifacts + diff
//!
//!  routers ──► StateCollector ──► Snapshot ──┐
//!  junit.xml ──► TestSummary ────────────────┼──► Report ──► docs/report.md
//!  DRIFT_STATUS ──► DriftStatus ─────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use netauto::prelude::*;
//!
//! let config = Config::load(None)?;
//! let checker = DriftChecker::from_template_file(
//!     &config.paths.template,
//!     Box::new(FileVarStore::new(&config.paths.group_vars, &config.paths.host_vars_dir)),
//!     Box::new(DirBackupStore::new(&config.paths.backups_dir)),
//!     config.drift_config(),
//! )?;
//! let report = checker.check(&config.host_source().resolve()?);
//! std::process::exit(report.exit_code());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::backup::{BackupStore, DirBackupStore};
    pub use crate::collect::{HostState, Snapshot, StateCollector};
    pub use crate::config::Config;
    pub use crate::connection::{
        CommandResult, Connection, ConnectionError, ConnectionFactory, DockerConnection,
        DockerConnectionFactory, ExecuteOptions,
    };
    pub use crate::drift::{CompareScope, DriftChecker, DriftConfig, DriftReport, HostFailure};
    pub use crate::error::{Error, Result};
    pub use crate::hosts::HostSource;
    pub use crate::normalize::normalize;
    pub use crate::probe::{Probe, ProbeOutcome, ProbeRunner, ProbeStatus};
    pub use crate::report::{DriftStatus, Report, TestSummary};
    pub use crate::section::{extract_ospf, extract_section};
    pub use crate::template::{TemplateRenderer, Vars};
    pub use crate::vars::{build_context, FileVarStore, MemoryVarStore, VarStore};
}

// ============================================================================
// Error Handling
// ============================================================================

/// Error types and the crate-wide `Result` alias.
pub mod error;

// ============================================================================
// Rendering Pipeline
// ============================================================================

/// Strict two-pass Jinja2 rendering via minijinja.
///
/// Variables may contain template directives themselves; the first pass
/// output is rendered once more against the same context.
pub mod template;

/// Extraction of configuration sub-sections such as `router ospf`.
pub mod section;

/// Whitespace canonicalization applied before comparison.
pub mod normalize;

/// Group and host variables (YAML) and rendering context assembly.
pub mod vars;

/// Backed-up running configurations.
pub mod backup;

/// Host enumeration from configuration or the backups directory.
pub mod hosts;

// ============================================================================
// Drift Detection
// ============================================================================

/// Drift comparison of rendered intent against backups.
///
/// Hosts fail independently; the batch verdict is all-or-nothing and maps to
/// the process exit status.
pub mod drift;

/// Unified diffs built with `similar`.
pub mod diff;

// ============================================================================
// Device Access
// ============================================================================

/// Connection layer for executing commands inside lab containers.
pub mod connection;

/// Live state collection into JSON snapshots.
pub mod collect;

/// Lab health probes.
pub mod probe;

/// Retry policies used by probes.
pub mod retry;

// ============================================================================
// Reporting
// ============================================================================

/// Metrics, JUnit summaries and the idempotent Markdown health report.
pub mod report;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration management for Netauto behavior.
///
/// Handles loading and merging configuration from multiple sources:
/// configuration files and environment variables.
pub mod config;

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of Netauto.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
