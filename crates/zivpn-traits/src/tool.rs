//! External tool seams.
//!
//! The remote store and the service manager are only reachable through
//! command-line tools. These traits are the boundary: production code shells
//! out, tests substitute fakes that record calls and return scripted output.

use async_trait::async_trait;
use std::path::Path;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Combined diagnostic text, stderr first.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (false, false) => format!("{}\n{}", stderr, stdout),
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (true, true) => match self.code {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            },
        }
    }
}

/// Command-line synchronization tool addressing a single remote location.
///
/// Remote objects are addressed by file name relative to that location.
/// Spawn failures and timeouts surface as `Err`; a tool that ran and
/// reported failure is `Ok` with `success == false`.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Copy a local file into the remote location.
    async fn upload(&self, local_file: &Path) -> std::io::Result<ToolOutput>;

    /// Structured (JSON array) listing of the remote location.
    async fn list_json(&self) -> std::io::Result<ToolOutput>;

    /// Copy one remote object into a local directory.
    async fn download(&self, remote_name: &str, local_dir: &Path) -> std::io::Result<ToolOutput>;

    /// Delete one remote object.
    async fn delete(&self, remote_name: &str) -> std::io::Result<ToolOutput>;
}

/// Restarts a named system service.
#[async_trait]
pub trait ServiceController: Send + Sync {
    async fn restart(&self, service: &str) -> std::io::Result<ToolOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = ToolOutput {
            success: false,
            code: Some(1),
            stdout: "partial".to_string(),
            stderr: "ERROR: boom\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "ERROR: boom\npartial");
    }

    #[test]
    fn test_diagnostic_falls_back_to_exit_code() {
        let output = ToolOutput::failed(3, "");
        assert_eq!(output.diagnostic(), "exit status 3");
    }
}
