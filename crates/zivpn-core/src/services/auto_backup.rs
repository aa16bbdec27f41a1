//! Auto-backup toggle.
//!
//! The policy document is the source of truth; the cron.d entry is derived
//! from it on every toggle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use zivpn_storage::fs_utils::write_atomic;
use zivpn_storage::{AutoBackupPolicy, Storage};
use zivpn_traits::{AdminError, Result};

use crate::settings::AutoBackupSettings;

const CRON_FIELDS: usize = 5;
const CRON_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

#[derive(Clone)]
pub struct AutoBackupService {
    storage: Arc<Storage>,
    cron_file: PathBuf,
    default_schedule: String,
    command: String,
    lock: Arc<Mutex<()>>,
}

impl AutoBackupService {
    pub fn new(storage: Arc<Storage>, cron_file: PathBuf, settings: &AutoBackupSettings) -> Self {
        Self {
            storage,
            cron_file,
            default_schedule: settings.default_schedule.clone(),
            command: settings.command.clone(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn status(&self) -> Result<AutoBackupPolicy> {
        self.storage.policy.load(&self.default_schedule)
    }

    /// Flip the policy and install or remove the cron entry to match.
    pub async fn toggle(&self) -> Result<AutoBackupPolicy> {
        let _guard = self.lock.lock().await;

        let mut policy = self.storage.policy.load(&self.default_schedule)?;
        policy.enabled = !policy.enabled;

        if policy.enabled {
            self.install_entry(&policy.schedule)?;
        } else {
            self.remove_entry()?;
        }
        self.storage.policy.save(&policy)?;

        info!(
            enabled = policy.enabled,
            schedule = %policy.schedule,
            cron_file = %self.cron_file.display(),
            "Auto-backup toggled"
        );
        Ok(policy)
    }

    fn install_entry(&self, schedule: &str) -> Result<()> {
        if schedule.split_whitespace().count() != CRON_FIELDS {
            return Err(AdminError::invalid(format!(
                "schedule '{}' must have {} cron fields",
                schedule, CRON_FIELDS
            )));
        }
        if let Some(parent) = self.cron_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AdminError::io("create", parent, e))?;
        }
        write_atomic(&self.cron_file, cron_entry(schedule, &self.command).as_bytes())
    }

    fn remove_entry(&self) -> Result<()> {
        match std::fs::remove_file(&self.cron_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdminError::io("remove", &self.cron_file, e)),
        }
    }
}

fn cron_entry(schedule: &str, command: &str) -> String {
    format!(
        "# Installed by zivpn: scheduled configuration backup\n\
         SHELL=/bin/sh\n\
         PATH={}\n\
         {} root {}\n",
        CRON_PATH,
        schedule.trim(),
        command
    )
}
