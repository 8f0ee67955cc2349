//! Command execution inside lab containers.
//!
//! Device state and running configuration are read by running `vtysh` (or plain
//! shell commands on the lab hosts) inside the containerlab containers. All
//! transports implement the [`Connection`] trait so the collector and the probes
//! never need to know how a command reaches the node.
//!
//! # Example
//!
//! ```rust,ignore
//! use netauto::connection::{Connection, DockerConnection, ExecuteOptions};
//!
//! let conn = DockerConnection::new("clab-netauto-r1");
//! let result = conn
//!     .execute("vtysh -c 'show ip route'", Some(ExecuteOptions::new().with_timeout(25)))
//!     .await?;
//! println!("{}", result.stdout);
//! ```

/// Docker container connection implementation.
pub mod docker;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use docker::{DockerConnection, DockerConnectionFactory};

/// Errors that can occur during connection operations.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Command execution failed (not to be confused with non-zero exit code).
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// The command did not finish within its time bound.
    #[error("Command timeout after {0} seconds")]
    Timeout(u64),
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// The result of executing a command on a connection.
///
/// # Example
///
/// ```rust
/// use netauto::connection::CommandResult;
///
/// let result = CommandResult::success("Hello".into(), String::new());
/// assert!(result.success);
/// assert_eq!(result.exit_code, 0);
///
/// let failed = CommandResult::failure(1, String::new(), "error".into());
/// assert!(!failed.success);
/// ```
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code of the command (0 typically indicates success).
    pub exit_code: i32,
    /// Content written to standard output.
    pub stdout: String,
    /// Content written to standard error.
    pub stderr: String,
    /// Convenience flag: `true` if `exit_code == 0`.
    pub success: bool,
}

impl CommandResult {
    /// Create a new successful command result
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            exit_code: 0,
            stdout,
            stderr,
            success: true,
        }
    }

    /// Create a new failed command result
    pub fn failure(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            success: false,
        }
    }

    /// Get the combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Options for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Timeout in seconds (None for no timeout)
    pub timeout: Option<u64>,
}

impl ExecuteOptions {
    /// Create new execute options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The connection trait every transport implements.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the connection identifier (container name)
    fn identifier(&self) -> &str;

    /// Execute a command on the target.
    ///
    /// A non-zero exit status is reported through [`CommandResult`], not as an
    /// error. Errors are reserved for spawn failures and timeouts.
    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult>;
}

/// Hands out a connection for a lab node.
pub trait ConnectionFactory: Send + Sync {
    /// Resolve `host` (a container name or a node alias) to a connection.
    fn connect(&self, host: &str) -> Arc<dyn Connection>;
}
