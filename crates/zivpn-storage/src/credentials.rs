//! Credential Store: the service configuration document and the ledger.
//!
//! The two files are kept in lock-step by the caller; this type only
//! provides durable reads and writes of each one. It holds no lock.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use zivpn_traits::{AdminError, Result};

use crate::fs_utils::write_atomic;
use crate::ledger::{LedgerEntry, parse_ledger, render_ledger};
use crate::paths::StoragePaths;
use crate::vpn_config::VpnConfig;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    config_path: PathBuf,
    ledger_path: PathBuf,
}

impl CredentialStore {
    pub fn new(paths: &StoragePaths) -> Self {
        Self {
            config_path: paths.config_file(),
            ledger_path: paths.ledger_file(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Parse the configuration document. A missing file is an error.
    pub fn load_configuration(&self) -> Result<VpnConfig> {
        let contents = fs::read_to_string(&self.config_path)
            .map_err(|e| AdminError::io("read", &self.config_path, e))?;
        serde_json::from_str(&contents).map_err(|source| AdminError::Parse {
            path: self.config_path.clone(),
            source,
        })
    }

    /// Serialize with two-space indentation and replace the file atomically.
    pub fn save_configuration(&self, config: &VpnConfig) -> Result<()> {
        let mut contents =
            serde_json::to_string_pretty(config).map_err(|source| AdminError::Parse {
                path: self.config_path.clone(),
                source,
            })?;
        contents.push('\n');
        write_atomic(&self.config_path, contents.as_bytes())
    }

    /// Read all well-formed ledger records. A missing ledger is empty.
    pub fn load_ledger(&self) -> Result<Vec<LedgerEntry>> {
        match fs::read_to_string(&self.ledger_path) {
            Ok(contents) => Ok(parse_ledger(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AdminError::io("read", &self.ledger_path, e)),
        }
    }

    /// Overwrite the whole ledger, one record per line.
    pub fn save_ledger(&self, entries: &[LedgerEntry]) -> Result<()> {
        write_atomic(&self.ledger_path, render_ledger(entries).as_bytes())
    }

    /// Append one record, creating the ledger if needed.
    pub fn append_ledger(&self, entry: &LedgerEntry) -> Result<()> {
        let needs_newline = !ends_with_newline(&self.ledger_path)
            .map_err(|e| AdminError::io("read", &self.ledger_path, e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.ledger_path)
            .map_err(|e| AdminError::io("open", &self.ledger_path, e))?;

        let mut line = String::new();
        if needs_newline {
            line.push('\n');
        }
        line.push_str(&entry.to_line());
        line.push('\n');

        file.write_all(line.as_bytes())
            .map_err(|e| AdminError::io("append to", &self.ledger_path, e))
    }
}

/// True for a missing or empty file, or one whose last byte is `\n`.
fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
