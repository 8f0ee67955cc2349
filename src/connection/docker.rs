//! Docker connection module
//!
//! Runs commands inside containerlab containers through the docker CLI
//! (`docker exec <container> sh -c <command>`).

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{
    CommandResult, Connection, ConnectionError, ConnectionFactory, ConnectionResult,
    ExecuteOptions,
};

/// Docker connection for executing commands inside containers
#[derive(Debug, Clone)]
pub struct DockerConnection {
    /// Container ID or name
    container: String,
    /// Docker executable path (default: "docker")
    docker_path: String,
}

impl DockerConnection {
    /// Create a new Docker connection
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            docker_path: "docker".to_string(),
        }
    }

    /// Create a new Docker connection with a custom docker path
    pub fn with_docker_path(container: impl Into<String>, docker_path: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            docker_path: docker_path.into(),
        }
    }

    /// Build the docker exec command
    fn build_exec_command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.docker_path);

        cmd.arg("exec").arg("-i").arg(&self.container);
        cmd.arg("sh").arg("-c").arg(command);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

#[async_trait]
impl Connection for DockerConnection {
    fn identifier(&self) -> &str {
        &self.container
    }

    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult> {
        let options = options.unwrap_or_default();

        debug!(
            container = %self.container,
            command = %command,
            "Executing command in Docker container"
        );

        let mut cmd = self.build_exec_command(command);

        let child = cmd.spawn().map_err(|e| {
            ConnectionError::ExecutionFailed(format!("Failed to execute docker exec: {}", e))
        })?;

        // Dropping the wait future on timeout kills the child (kill_on_drop).
        let output = if let Some(timeout_secs) = options.timeout {
            let timeout = tokio::time::Duration::from_secs(timeout_secs);
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result.map_err(|e| {
                    ConnectionError::ExecutionFailed(format!("Failed to wait for process: {}", e))
                })?,
                Err(_) => return Err(ConnectionError::Timeout(timeout_secs)),
            }
        } else {
            child.wait_with_output().await.map_err(|e| {
                ConnectionError::ExecutionFailed(format!("Failed to wait for process: {}", e))
            })?
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        trace!(
            exit_code = %exit_code,
            stdout_len = %stdout.len(),
            stderr_len = %stderr.len(),
            "Docker exec completed"
        );

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr))
        } else {
            Ok(CommandResult::failure(exit_code, stdout, stderr))
        }
    }
}

/// Maps lab node names to container connections.
///
/// Containerlab names containers `<prefix>-<node>`. Hosts that already carry
/// the prefix (for example names taken from backup file stems) are used as-is.
#[derive(Debug, Clone)]
pub struct DockerConnectionFactory {
    docker_path: String,
    prefix: Option<String>,
}

impl DockerConnectionFactory {
    /// Create a factory that uses host names as container names verbatim.
    pub fn new(docker_path: impl Into<String>) -> Self {
        Self {
            docker_path: docker_path.into(),
            prefix: None,
        }
    }

    /// Prefix bare node names (`r1`) with the lab prefix (`clab-netauto-r1`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Resolve a node name to its container name.
    pub fn container_name(&self, host: &str) -> String {
        match &self.prefix {
            Some(prefix) if !host.starts_with(&format!("{}-", prefix)) => {
                format!("{}-{}", prefix, host)
            }
            _ => host.to_string(),
        }
    }
}

impl ConnectionFactory for DockerConnectionFactory {
    fn connect(&self, host: &str) -> Arc<dyn Connection> {
        Arc::new(DockerConnection::with_docker_path(
            self.container_name(host),
            self.docker_path.clone(),
        ))
    }
}
