//! Remote Backup Gateway.
//!
//! Turns raw [`SyncBackend`] invocations into typed results. Every archive
//! lives in the remote location as `<id>.zip`; the id is the file stem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use zivpn_traits::{AdminError, Result, SyncBackend, ToolOutput};

pub const ARCHIVE_SUFFIX: &str = ".zip";

/// rclone's exit status for "directory not found".
const EXIT_DIR_NOT_FOUND: i32 = 3;

/// One archive present in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackup {
    pub id: String,
    pub filename: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// Object descriptor as printed by `rclone lsjson`.
#[derive(Debug, Deserialize)]
struct ListedObject {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Size", default)]
    size: i64,
    #[serde(rename = "ModTime", default)]
    mod_time: Option<String>,
    #[serde(rename = "IsDir", default)]
    is_dir: bool,
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

pub fn archive_name(id: &str) -> String {
    format!("{}{}", id, ARCHIVE_SUFFIX)
}

/// Reject ids that could not have come from [`archive_name`] or that would
/// address anything outside the remote location.
pub fn validate_backup_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AdminError::invalid("backup_id is required"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AdminError::invalid(format!(
            "backup_id '{}' may only contain letters, digits, '-' and '_'",
            id
        )));
    }
    Ok(id)
}

/// Parse `lsjson` output into archive entries.
///
/// Directories, non-archive names and malformed descriptors are skipped.
/// Output that is not a JSON array at all is a `ListFailed`.
pub fn parse_listing(stdout: &str) -> Result<Vec<RemoteBackup>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Vec<Value> = serde_json::from_str(stdout).map_err(|e| AdminError::ListFailed {
        output: format!("unparseable listing: {}", e),
    })?;

    let mut backups = Vec::new();
    for item in items {
        let object: ListedObject = match serde_json::from_value(item) {
            Ok(object) => object,
            Err(e) => {
                debug!(error = %e, "Skipping malformed listing entry");
                continue;
            }
        };
        if object.is_dir {
            continue;
        }
        let Some(stem) = object.name.strip_suffix(ARCHIVE_SUFFIX) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }
        let modified = object.mod_time.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| warn!(name = %object.name, mod_time = raw, error = %e, "Unparseable ModTime"))
                .ok()
        });
        backups.push(RemoteBackup {
            id: stem.to_string(),
            filename: object.name.clone(),
            size: object.size,
            modified,
            remote_id: object.id.filter(|id| !id.is_empty()),
        });
    }
    Ok(backups)
}

#[derive(Clone)]
pub struct RemoteBackupGateway {
    backend: Arc<dyn SyncBackend>,
}

impl RemoteBackupGateway {
    pub fn new(backend: Arc<dyn SyncBackend>) -> Self {
        Self { backend }
    }

    pub async fn upload(&self, archive: &Path) -> Result<()> {
        match self.backend.upload(archive).await {
            Ok(output) if output.success => Ok(()),
            Ok(output) => Err(AdminError::UploadFailed {
                output: output.diagnostic(),
            }),
            Err(e) => Err(AdminError::UploadFailed {
                output: e.to_string(),
            }),
        }
    }

    pub async fn list(&self) -> Result<Vec<RemoteBackup>> {
        let output = self
            .backend
            .list_json()
            .await
            .map_err(|e| AdminError::ListFailed {
                output: e.to_string(),
            })?;
        if !output.success {
            if is_missing_remote(&output) {
                debug!("Remote backup location does not exist yet");
                return Ok(Vec::new());
            }
            return Err(AdminError::ListFailed {
                output: output.diagnostic(),
            });
        }
        parse_listing(&output.stdout)
    }

    /// Copy `<id>.zip` into `staging_dir` and return the local path.
    pub async fn fetch(&self, id: &str, staging_dir: &Path) -> Result<PathBuf> {
        let name = archive_name(id);
        match self.backend.download(&name, staging_dir).await {
            Ok(output) if output.success => Ok(staging_dir.join(name)),
            Ok(output) => Err(AdminError::FetchFailed {
                output: output.diagnostic(),
            }),
            Err(e) => Err(AdminError::FetchFailed {
                output: e.to_string(),
            }),
        }
    }

    /// Best-effort deletion; `false` means the tool refused or never ran.
    pub async fn delete(&self, id: &str) -> bool {
        let name = archive_name(id);
        match self.backend.delete(&name).await {
            Ok(output) if output.success => true,
            Ok(output) => {
                warn!(backup_id = %id, output = %output.diagnostic(), "Remote delete failed");
                false
            }
            Err(e) => {
                warn!(backup_id = %id, error = %e, "Remote delete failed");
                false
            }
        }
    }
}

fn is_missing_remote(output: &ToolOutput) -> bool {
    output.code == Some(EXIT_DIR_NOT_FOUND)
}
