//! ZiVPN Storage - File-backed persistence for the admin backend
//!
//! Everything lives as plain files under one configuration root that the
//! VPN daemon itself reads.
//!
//! # Files
//!
//! - `config.json` - Service listen parameters and the credential list
//! - `users.db` - Ledger of `secret | expiry` records
//! - `domain`, `apikey` - Single-value text files
//! - `auto-backup.json` - Auto-backup policy

pub mod credentials;
pub mod fs_utils;
pub mod ledger;
pub mod paths;
pub mod policy;
pub mod vpn_config;

use zivpn_traits::Result;

pub use credentials::CredentialStore;
pub use ledger::{LedgerEntry, format_date};
pub use paths::StoragePaths;
pub use policy::{AutoBackupPolicy, PolicyStore};
pub use vpn_config::{AuthSection, VpnConfig};

/// Central storage manager for every file under the configuration root
#[derive(Debug, Clone)]
pub struct Storage {
    paths: StoragePaths,
    pub credentials: CredentialStore,
    pub policy: PolicyStore,
}

impl Storage {
    pub fn new(paths: StoragePaths) -> Self {
        let credentials = CredentialStore::new(&paths);
        let policy = PolicyStore::new(paths.auto_backup_file());
        Self {
            paths,
            credentials,
            policy,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Service domain name, if configured.
    pub fn domain(&self) -> Result<Option<String>> {
        Ok(fs_utils::read_trimmed(&self.paths.domain_file())?.filter(|d| !d.is_empty()))
    }

    /// API key guarding the HTTP surface, if configured.
    pub fn api_key(&self) -> Result<Option<String>> {
        Ok(fs_utils::read_trimmed(&self.paths.api_key_file())?.filter(|k| !k.is_empty()))
    }
}
