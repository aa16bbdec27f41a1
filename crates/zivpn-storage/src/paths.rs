//! File layout under the service configuration root.
//!
//! Callers depend on the roles below, never on literal paths.

use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_ROOT: &str = "/etc/zivpn";

const CONFIG_FILE: &str = "config.json";
const LEDGER_FILE: &str = "users.db";
const DOMAIN_FILE: &str = "domain";
const API_KEY_FILE: &str = "apikey";
const BOT_CONFIG_FILE: &str = "bot-config.json";
const CERT_FILE: &str = "zivpn.crt";
const KEY_FILE: &str = "zivpn.key";
const AUTO_BACKUP_FILE: &str = "auto-backup.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_ROOT)
    }
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Service configuration document (listen parameters + credential list).
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Plain-text credential ledger.
    pub fn ledger_file(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn domain_file(&self) -> PathBuf {
        self.root.join(DOMAIN_FILE)
    }

    pub fn api_key_file(&self) -> PathBuf {
        self.root.join(API_KEY_FILE)
    }

    pub fn bot_config_file(&self) -> PathBuf {
        self.root.join(BOT_CONFIG_FILE)
    }

    pub fn cert_file(&self) -> PathBuf {
        self.root.join(CERT_FILE)
    }

    pub fn key_file(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    pub fn auto_backup_file(&self) -> PathBuf {
        self.root.join(AUTO_BACKUP_FILE)
    }

    /// The fixed set of files captured by a backup archive.
    pub fn backup_set(&self) -> Vec<PathBuf> {
        vec![
            self.config_file(),
            self.ledger_file(),
            self.domain_file(),
            self.api_key_file(),
            self.bot_config_file(),
            self.cert_file(),
            self.key_file(),
        ]
    }
}
