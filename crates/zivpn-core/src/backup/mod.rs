//! Backup plumbing: local archives and the remote store.

pub mod archive;
pub mod gateway;

pub use archive::{ArchiveReport, ExtractReport, build_archive, extract_archive};
pub use gateway::{
    ARCHIVE_SUFFIX, RemoteBackup, RemoteBackupGateway, archive_name, parse_listing,
    validate_backup_id,
};
