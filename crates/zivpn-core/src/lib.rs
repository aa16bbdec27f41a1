pub mod backup;
pub mod process;
pub mod restart;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use settings::Settings;
pub use zivpn_traits::{AdminError, ErrorKind, Result};

use std::sync::Arc;

use tracing::info;
use zivpn_storage::{Storage, StoragePaths};
use zivpn_traits::{Clock, ServiceController, SyncBackend, SystemClock};

use backup::RemoteBackupGateway;
use process::{RcloneBackend, SystemdController};
use restart::RestartNotifier;
use services::{AutoBackupService, BackupService, CredentialManager, SystemInfo};

/// Core application state shared between the HTTP server and the CLI
///
/// Owns the storage handle and one instance of each service, so both
/// process-wide locks live here.
pub struct AppCore {
    pub settings: Settings,
    pub storage: Arc<Storage>,
    pub credentials: CredentialManager,
    pub backups: BackupService,
    pub auto_backup: AutoBackupService,
    restarts: RestartNotifier,
    clock: Arc<dyn Clock>,
}

impl AppCore {
    /// Wire the production collaborators: rclone, systemctl, the system clock.
    pub fn new(settings: Settings) -> Self {
        let backend = Arc::new(RcloneBackend::new(&settings.backup));
        let controller = Arc::new(SystemdController::new(&settings.services));
        Self::with_collaborators(settings, backend, controller, Arc::new(SystemClock))
    }

    pub fn with_collaborators(
        settings: Settings,
        backend: Arc<dyn SyncBackend>,
        controller: Arc<dyn ServiceController>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let storage = Arc::new(Storage::new(StoragePaths::new(&settings.paths.config_root)));
        let restarts = RestartNotifier::new(controller, settings.services.restart.clone());

        let credentials = CredentialManager::new(storage.clone(), clock.clone(), restarts.clone());
        let backups = BackupService::new(
            storage.clone(),
            RemoteBackupGateway::new(backend),
            clock.clone(),
            restarts.clone(),
            settings.paths.staging_dir.clone(),
            settings.backup.retention_days,
        );
        let auto_backup = AutoBackupService::new(
            storage.clone(),
            settings.paths.cron_file.clone(),
            &settings.auto_backup,
        );

        info!(
            config_root = %settings.paths.config_root.display(),
            remote = %settings.backup.remote,
            "Initializing ZiVPN admin core"
        );

        Self {
            settings,
            storage,
            credentials,
            backups,
            auto_backup,
            restarts,
            clock,
        }
    }

    pub fn system_info(&self) -> Result<SystemInfo> {
        services::system_info(&self.storage, self.clock.as_ref(), self.settings.server.port)
    }

    /// Wait for restarts scheduled by earlier mutations.
    pub async fn settle_restarts(&self) {
        self.restarts.settle().await;
    }

    /// The API key guarding the HTTP surface, if one is configured.
    pub fn api_key(&self) -> Result<Option<String>> {
        self.storage.api_key()
    }
}
