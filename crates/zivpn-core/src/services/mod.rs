pub mod auto_backup;
pub mod backup;
pub mod credentials;
pub mod system;

pub use auto_backup::AutoBackupService;
pub use backup::{BackupCreated, BackupService, CleanupReport, RestoreReport};
pub use credentials::{CredentialGrant, CredentialManager, CredentialRecord, CredentialStatus};
pub use system::{SystemInfo, system_info};
pub use zivpn_storage::AutoBackupPolicy;
