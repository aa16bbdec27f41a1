//! Credential Lifecycle Manager.
//!
//! Owns the credential lock. Every mutation reads and writes both the
//! configuration document and the ledger while holding it, then schedules a
//! restart once the lock is released.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use zivpn_storage::{LedgerEntry, Storage};
use zivpn_traits::{AdminError, Clock, Result};

use crate::restart::RestartNotifier;

pub const TRIAL_PREFIX: &str = "TRIAL";
pub const TRIAL_DAYS: i64 = 1;
const TRIAL_ATTEMPTS: u32 = 5;
pub(crate) const UNKNOWN_DOMAIN: &str = "unknown";

/// Result of a create, trial or renew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialGrant {
    #[serde(rename = "password")]
    pub secret: String,
    #[serde(rename = "expired")]
    pub expiry: String,
    pub domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
    Active,
    Expired,
}

/// One ledger record as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "password")]
    pub secret: String,
    #[serde(rename = "expired")]
    pub expiry: String,
    pub status: CredentialStatus,
}

#[derive(Clone)]
pub struct CredentialManager {
    storage: Arc<Storage>,
    clock: Arc<dyn Clock>,
    restarts: RestartNotifier,
    lock: Arc<Mutex<()>>,
}

impl CredentialManager {
    pub fn new(storage: Arc<Storage>, clock: Arc<dyn Clock>, restarts: RestartNotifier) -> Self {
        Self {
            storage,
            clock,
            restarts,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn create(&self, secret: &str, days: i64) -> Result<CredentialGrant> {
        let secret = validate_secret(secret)?;
        let days = validate_days(days)?;

        let expiry = {
            let _guard = self.lock.lock().await;
            self.create_locked(secret, days)?
        };
        info!(secret = %secret, expiry = %expiry, "Credential created");
        self.restarts.notify("credential created");

        Ok(CredentialGrant {
            secret: secret.to_string(),
            expiry,
            domain: self.domain(),
        })
    }

    fn create_locked(&self, secret: &str, days: u64) -> Result<String> {
        let store = &self.storage.credentials;
        let mut config = store.load_configuration()?;
        if config.contains(secret) {
            return Err(AdminError::Conflict(format!("Credential '{}'", secret)));
        }
        let expiry = add_days(self.clock.today(), days)?;

        config.add_credential(secret);
        store.save_configuration(&config)?;

        let entry = LedgerEntry::new(secret, expiry);
        if let Err(e) = self.record_created(secret, &entry) {
            self.log_divergence(secret, "create", &e);
            return Err(e);
        }
        Ok(entry.expiry)
    }

    /// Append the new record, replacing any stale lines left for the secret.
    fn record_created(&self, secret: &str, entry: &LedgerEntry) -> Result<()> {
        let store = &self.storage.credentials;
        let entries = store.load_ledger()?;
        let before = entries.len();
        let mut kept: Vec<LedgerEntry> = entries.into_iter().filter(|e| e.secret != secret).collect();
        let stale = before - kept.len();
        if stale == 0 {
            return store.append_ledger(entry);
        }
        warn!(secret = %secret, stale, "Replacing stale ledger records");
        kept.push(entry.clone());
        store.save_ledger(&kept)
    }

    pub async fn delete(&self, secret: &str) -> Result<()> {
        let secret = require_secret(secret)?;
        {
            let _guard = self.lock.lock().await;
            self.delete_locked(secret)?;
        }
        info!(secret = %secret, "Credential deleted");
        self.restarts.notify("credential deleted");
        Ok(())
    }

    fn delete_locked(&self, secret: &str) -> Result<()> {
        let store = &self.storage.credentials;
        let mut config = store.load_configuration()?;
        if !config.remove_credential(secret) {
            return Err(AdminError::NotFound(format!("Credential '{}'", secret)));
        }
        store.save_configuration(&config)?;

        let ledger = store.load_ledger().and_then(|entries| {
            let kept: Vec<LedgerEntry> = entries.into_iter().filter(|e| e.secret != secret).collect();
            store.save_ledger(&kept)
        });
        if let Err(e) = ledger {
            self.log_divergence(secret, "delete", &e);
            return Err(e);
        }
        Ok(())
    }

    pub async fn renew(&self, secret: &str, days: i64) -> Result<CredentialGrant> {
        let secret = require_secret(secret)?;
        let days = validate_days(days)?;

        let expiry = {
            let _guard = self.lock.lock().await;
            self.renew_locked(secret, days)?
        };
        info!(secret = %secret, expiry = %expiry, "Credential renewed");
        self.restarts.notify("credential renewed");

        Ok(CredentialGrant {
            secret: secret.to_string(),
            expiry,
            domain: self.domain(),
        })
    }

    fn renew_locked(&self, secret: &str, days: u64) -> Result<String> {
        let store = &self.storage.credentials;
        let today = self.clock.today();
        let entries = store.load_ledger()?;

        let mut renewed = None;
        let mut duplicates = 0usize;
        let mut updated = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.secret != secret {
                updated.push(entry);
                continue;
            }
            if renewed.is_some() {
                duplicates += 1;
                continue;
            }
            // An expired or unreadable expiry restarts from today.
            let base = entry.expiry_date().map_or(today, |current| current.max(today));
            let entry = LedgerEntry::new(secret, add_days(base, days)?);
            renewed = Some(entry.expiry.clone());
            updated.push(entry);
        }

        let Some(expiry) = renewed else {
            return Err(AdminError::NotFound(format!("Credential '{}'", secret)));
        };
        if duplicates > 0 {
            warn!(secret = %secret, duplicates, "Collapsed duplicate ledger records");
        }
        store.save_ledger(&updated)?;
        Ok(expiry)
    }

    /// Snapshot of the ledger; takes no lock.
    pub fn list(&self) -> Result<Vec<CredentialRecord>> {
        let today = self.clock.today();
        let entries = self.storage.credentials.load_ledger()?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let status = if entry.is_expired_on(today) {
                    CredentialStatus::Expired
                } else {
                    CredentialStatus::Active
                };
                CredentialRecord {
                    secret: entry.secret,
                    expiry: entry.expiry,
                    status,
                }
            })
            .collect())
    }

    /// Create a one-day `TRIAL<nnnn>` credential, retrying on collisions.
    pub async fn create_trial(&self) -> Result<CredentialGrant> {
        let mut attempt = 1;
        loop {
            let secret = trial_secret();
            match self.create(&secret, TRIAL_DAYS).await {
                Err(AdminError::Conflict(_)) if attempt < TRIAL_ATTEMPTS => {
                    debug!(secret = %secret, attempt, "Trial secret taken, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn domain(&self) -> String {
        match self.storage.domain() {
            Ok(Some(domain)) => domain,
            Ok(None) => UNKNOWN_DOMAIN.to_string(),
            Err(e) => {
                warn!(error = %e, "Cannot read domain file");
                UNKNOWN_DOMAIN.to_string()
            }
        }
    }

    fn log_divergence(&self, secret: &str, operation: &str, cause: &AdminError) {
        let store = &self.storage.credentials;
        error!(
            secret = %secret,
            operation,
            config = %store.config_path().display(),
            ledger = %store.ledger_path().display(),
            error = %cause,
            "Credential files diverged: configuration written, ledger update failed"
        );
    }
}

fn trial_secret() -> String {
    format!("{}{}", TRIAL_PREFIX, rand::rng().random_range(1000..10000))
}

/// A secret must survive a round trip through a `secret | date` line.
fn validate_secret(secret: &str) -> Result<&str> {
    let secret = require_secret(secret)?;
    if secret.contains('|') || secret.chars().any(char::is_whitespace) {
        return Err(AdminError::invalid(
            "password may not contain '|' or whitespace",
        ));
    }
    Ok(secret)
}

fn require_secret(secret: &str) -> Result<&str> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(AdminError::invalid("password is required"));
    }
    Ok(secret)
}

fn validate_days(days: i64) -> Result<u64> {
    match u64::try_from(days) {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(AdminError::invalid("days must be greater than zero")),
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| AdminError::invalid(format!("{} days is out of range", days)))
}
