//! Auto-backup policy document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zivpn_traits::{AdminError, Result};

use crate::fs_utils::write_atomic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoBackupPolicy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub schedule: String,
}

#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the policy. A missing document, or one without a schedule,
    /// falls back to `default_schedule`.
    pub fn load(&self, default_schedule: &str) -> Result<AutoBackupPolicy> {
        let mut policy = match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str::<AutoBackupPolicy>(&contents).map_err(
                |source| AdminError::Parse {
                    path: self.path.clone(),
                    source,
                },
            )?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AutoBackupPolicy {
                enabled: false,
                schedule: String::new(),
            },
            Err(e) => return Err(AdminError::io("read", &self.path, e)),
        };
        if policy.schedule.trim().is_empty() {
            policy.schedule = default_schedule.to_string();
        }
        Ok(policy)
    }

    pub fn save(&self, policy: &AutoBackupPolicy) -> Result<()> {
        let contents = serde_json::to_vec_pretty(policy).map_err(|source| AdminError::Parse {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &contents)
    }
}
