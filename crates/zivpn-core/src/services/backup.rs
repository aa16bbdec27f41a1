//! Backup creation, listing, restore and the retention sweep.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::TimeDelta;
use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zivpn_storage::Storage;
use zivpn_traits::{AdminError, Clock, Result};

use super::credentials::UNKNOWN_DOMAIN;
use crate::backup::{
    ExtractReport, RemoteBackup, RemoteBackupGateway, archive_name, build_archive,
    extract_archive, validate_backup_id,
};
use crate::restart::RestartNotifier;

pub const BACKUP_ID_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupCreated {
    pub backup_id: String,
    pub filename: String,
    pub domain: String,
    /// Names of the files captured in the archive.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub backup_id: String,
    pub restored: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct BackupService {
    storage: Arc<Storage>,
    gateway: RemoteBackupGateway,
    clock: Arc<dyn Clock>,
    restarts: RestartNotifier,
    staging_dir: PathBuf,
    retention: TimeDelta,
    lock: Arc<Mutex<()>>,
}

impl BackupService {
    pub fn new(
        storage: Arc<Storage>,
        gateway: RemoteBackupGateway,
        clock: Arc<dyn Clock>,
        restarts: RestartNotifier,
        staging_dir: PathBuf,
        retention_days: u32,
    ) -> Self {
        Self {
            storage,
            gateway,
            clock,
            restarts,
            staging_dir,
            retention: TimeDelta::days(i64::from(retention_days)),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Archive the backup set and upload it under a fresh id.
    ///
    /// The local archive is removed whether or not the upload succeeded.
    pub async fn create(&self) -> Result<BackupCreated> {
        let _guard = self.lock.lock().await;

        let backup_id = new_backup_id();
        let filename = archive_name(&backup_id);
        let staging = self
            .staging("backup")
            .map_err(|e| AdminError::Archive(e.to_string()))?;
        let archive = staging.path().join(&filename);

        let sources = self.storage.paths().backup_set();
        let report = run_blocking({
            let archive = archive.clone();
            move || build_archive(&archive, &sources)
        })
        .await?;
        debug!(backup_id = %backup_id, files = ?report.added, "Archive built");

        self.gateway.upload(&archive).await?;
        drop(staging);

        info!(backup_id = %backup_id, files = report.added.len(), "Backup uploaded");
        Ok(BackupCreated {
            backup_id,
            filename,
            domain: self
                .storage
                .domain()
                .ok()
                .flatten()
                .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string()),
            files: report.added,
        })
    }

    /// Archives in the remote store, newest first.
    pub async fn list(&self) -> Result<Vec<RemoteBackup>> {
        let mut backups = self.gateway.list().await?;
        backups.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(backups)
    }

    /// Fetch an archive and unpack it over the configuration root.
    pub async fn restore(&self, backup_id: &str) -> Result<RestoreReport> {
        let backup_id = validate_backup_id(backup_id)?.to_string();
        let staging = self.staging("restore")?;
        let archive = self.gateway.fetch(&backup_id, staging.path()).await?;

        let root = self.storage.paths().root().to_path_buf();
        let ExtractReport { restored, failed } =
            run_blocking(move || extract_archive(&archive, &root)).await?;
        drop(staging);

        if failed > 0 {
            warn!(backup_id = %backup_id, failed, "Restore skipped some archive members");
        }
        info!(backup_id = %backup_id, restored = restored.len(), "Backup restored");
        self.restarts.notify("backup restored");

        Ok(RestoreReport {
            backup_id,
            restored: restored.len(),
            failed,
        })
    }

    /// Delete every remote archive older than the retention window.
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let _guard = self.lock.lock().await;

        let now = self.clock.now();
        let mut report = CleanupReport::default();
        for backup in self.gateway.list().await? {
            let Some(modified) = backup.modified else {
                debug!(backup_id = %backup.id, "No modification time, keeping");
                continue;
            };
            if now - modified <= self.retention {
                continue;
            }
            if self.gateway.delete(&backup.id).await {
                info!(backup_id = %backup.id, modified = %modified, "Expired backup deleted");
                report.deleted += 1;
            } else {
                report.failed += 1;
            }
        }
        Ok(report)
    }

    fn staging(&self, purpose: &str) -> Result<TempDir> {
        std::fs::create_dir_all(&self.staging_dir)
            .map_err(|e| AdminError::io("create", &self.staging_dir, e))?;
        tempfile::Builder::new()
            .prefix(&format!("zivpn-{}-", purpose))
            .tempdir_in(&self.staging_dir)
            .map_err(|e| AdminError::io("create staging directory in", &self.staging_dir, e))
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }
}

fn new_backup_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BACKUP_ID_LEN)
        .map(char::from)
        .collect()
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AdminError::Archive(format!("archive task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DirSyncBackend, RecordingController, seed_config_root};
    use chrono::Utc;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;
    use zivpn_storage::StoragePaths;
    use zivpn_traits::{ErrorKind, FixedClock};

    const DAY_SECS: u64 = 24 * 60 * 60;

    struct Fixture {
        _dir: TempDir,
        storage: Arc<Storage>,
        backend: Arc<DirSyncBackend>,
        controller: Arc<RecordingController>,
        service: BackupService,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let root = dir.path().join("etc");
        seed_config_root(&root).unwrap();
        fs::write(root.join("users.db"), "alice | 2024-01-31\n").unwrap();

        let storage = Arc::new(Storage::new(StoragePaths::new(&root)));
        let backend = Arc::new(DirSyncBackend::new(dir.path().join("remote")));
        let controller = Arc::new(RecordingController::default());
        let service = BackupService::new(
            storage.clone(),
            RemoteBackupGateway::new(backend.clone()),
            Arc::new(FixedClock::new(Utc::now())),
            RestartNotifier::new(controller.clone(), vec!["zivpn".to_string()]),
            dir.path().join("staging"),
            7,
        );
        Fixture {
            _dir: dir,
            storage,
            backend,
            controller,
            service,
        }
    }

    fn staging_is_empty(fx: &Fixture) -> bool {
        fs::read_dir(fx.service.staging_dir())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    fn age(path: &Path, days: u64) {
        let when = SystemTime::now()
            .checked_sub(Duration::from_secs(days * DAY_SECS))
            .unwrap();
        filetime::set_file_mtime(path, filetime::FileTime::from_system_time(when)).unwrap();
    }

    #[tokio::test]
    async fn test_create_uploads_archive_named_by_id() {
        let fx = fixture();

        let created = fx.service.create().await.unwrap();

        assert_eq!(created.backup_id.len(), BACKUP_ID_LEN);
        assert!(created.backup_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(created.filename, format!("{}.zip", created.backup_id));
        assert_eq!(created.domain, "vpn.example.com");
        assert!(created.files.contains(&"users.db".to_string()));
        assert!(!created.files.contains(&"apikey".to_string()));
        assert_eq!(fx.backend.objects(), [created.filename.clone()]);
        assert!(staging_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_upload_failure_removes_local_archive() {
        let fx = fixture();
        fx.backend.fail_uploads("Failed to copy: couldn't connect");

        let err = fx.service.create().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UploadFailed);
        assert!(err.to_string().contains("couldn't connect"));
        assert!(staging_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_unusable_staging_dir_is_archive_error() {
        let fx = fixture();
        fs::write(fx.service.staging_dir(), "not a directory").unwrap();

        let err = fx.service.create().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Archive);
        assert!(fx.backend.objects().is_empty());
    }

    #[tokio::test]
    async fn test_backup_then_restore_reproduces_files() {
        let fx = fixture();
        let paths = fx.storage.paths().clone();
        let originals: Vec<(PathBuf, Option<Vec<u8>>)> = paths
            .backup_set()
            .into_iter()
            .map(|p| {
                let bytes = fs::read(&p).ok();
                (p, bytes)
            })
            .collect();

        let created = fx.service.create().await.unwrap();

        fs::write(paths.ledger_file(), "mallory | 2099-01-01\n").unwrap();
        fs::write(paths.config_file(), "{}").unwrap();
        fs::remove_file(paths.key_file()).unwrap();

        let report = fx.service.restore(&created.backup_id).await.unwrap();

        assert_eq!(report.failed, 0);
        assert_eq!(report.restored, created.files.len());
        for (path, bytes) in originals {
            if let Some(bytes) = bytes {
                assert_eq!(fs::read(&path).unwrap(), bytes, "{}", path.display());
            }
        }
        assert!(staging_is_empty(&fx));
        assert_eq!(fx.controller.wait_for_restarts(1).await, ["zivpn"]);
    }

    #[tokio::test]
    async fn test_restore_rejects_bad_and_unknown_ids() {
        let fx = fixture();

        let err = fx.service.restore("../../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        fs::create_dir_all(fx.backend.remote_dir()).unwrap();
        let err = fx.service.restore("doesnotexist").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchFailed);
        assert!(fx.controller.restarted().is_empty());
    }

    #[tokio::test]
    async fn test_restore_of_corrupt_archive_is_not_found() {
        let fx = fixture();
        fs::create_dir_all(fx.backend.remote_dir()).unwrap();
        fs::write(fx.backend.remote_path("corrupt.zip"), b"garbage").unwrap();

        let err = fx.service.restore("corrupt").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(staging_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_list_empty_remote() {
        let fx = fixture();
        assert!(fx.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let fx = fixture();
        let first = fx.service.create().await.unwrap();
        let second = fx.service.create().await.unwrap();
        age(&fx.backend.remote_path(&first.filename), 2);

        let ids: Vec<String> = fx.service.list().await.unwrap().into_iter().map(|b| b.id).collect();

        assert_eq!(ids, [second.backup_id, first.backup_id]);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_only_expired() {
        let fx = fixture();
        let old = fx.service.create().await.unwrap();
        let recent = fx.service.create().await.unwrap();
        age(&fx.backend.remote_path(&old.filename), 8);
        age(&fx.backend.remote_path(&recent.filename), 1);

        let report = fx.service.cleanup().await.unwrap();

        assert_eq!(report, CleanupReport { deleted: 1, failed: 0 });
        assert_eq!(fx.backend.objects(), [recent.filename]);
    }

    #[tokio::test]
    async fn test_cleanup_counts_refused_deletes() {
        let fx = fixture();
        let stuck = fx.service.create().await.unwrap();
        let old = fx.service.create().await.unwrap();
        age(&fx.backend.remote_path(&stuck.filename), 30);
        age(&fx.backend.remote_path(&old.filename), 30);
        fx.backend.refuse_delete(&stuck.filename);

        let report = fx.service.cleanup().await.unwrap();

        assert_eq!(report, CleanupReport { deleted: 1, failed: 1 });
        assert_eq!(fx.backend.objects(), [stuck.filename]);
    }

    #[tokio::test]
    async fn test_cleanup_surfaces_list_failure() {
        let fx = fixture();
        fx.backend.fail_listing("Failed to lsjson: 401 Unauthorized");

        let err = fx.service.cleanup().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ListFailed);
    }
}
