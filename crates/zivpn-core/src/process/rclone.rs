use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use zivpn_traits::{SyncBackend, ToolOutput};

use super::run_tool;
use crate::settings::BackupSettings;

/// [`SyncBackend`] backed by the `rclone` command-line tool.
#[derive(Debug, Clone)]
pub struct RcloneBackend {
    bin: String,
    remote: String,
    timeout: Duration,
}

impl RcloneBackend {
    pub fn new(settings: &BackupSettings) -> Self {
        Self {
            bin: settings.rclone_bin.clone(),
            remote: settings.remote.clone(),
            timeout: Duration::from_secs(settings.command_timeout_secs),
        }
    }

    /// `remote:dir` + `name` -> `remote:dir/name`; a bare `remote:` gets no slash.
    fn object_path(&self, name: &str) -> String {
        if self.remote.ends_with(':') || self.remote.ends_with('/') {
            format!("{}{}", self.remote, name)
        } else {
            format!("{}/{}", self.remote, name)
        }
    }
}

#[async_trait]
impl SyncBackend for RcloneBackend {
    async fn upload(&self, local_file: &Path) -> std::io::Result<ToolOutput> {
        run_tool(
            &self.bin,
            [
                OsStr::new("copy"),
                local_file.as_os_str(),
                OsStr::new(&self.remote),
            ],
            self.timeout,
        )
        .await
    }

    async fn list_json(&self) -> std::io::Result<ToolOutput> {
        run_tool(&self.bin, ["lsjson", self.remote.as_str()], self.timeout).await
    }

    async fn download(&self, remote_name: &str, local_dir: &Path) -> std::io::Result<ToolOutput> {
        let source = self.object_path(remote_name);
        run_tool(
            &self.bin,
            [
                OsStr::new("copy"),
                OsStr::new(&source),
                local_dir.as_os_str(),
            ],
            self.timeout,
        )
        .await
    }

    async fn delete(&self, remote_name: &str) -> std::io::Result<ToolOutput> {
        let target = self.object_path(remote_name);
        run_tool(&self.bin, ["deletefile", target.as_str()], self.timeout).await
    }
}
