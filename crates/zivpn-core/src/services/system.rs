//! Status summary for the info endpoint and `zivpn info`.

use serde::{Deserialize, Serialize};
use zivpn_storage::Storage;
use zivpn_traits::{Clock, Result};

use super::credentials::UNKNOWN_DOMAIN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub domain: String,
    pub listen: String,
    pub api_port: u16,
    pub credential_count: usize,
    pub active_count: usize,
    pub expired_count: usize,
}

pub fn system_info(storage: &Storage, clock: &dyn Clock, api_port: u16) -> Result<SystemInfo> {
    let config = storage.credentials.load_configuration()?;
    let ledger = storage.credentials.load_ledger()?;
    let today = clock.today();
    let expired_count = ledger.iter().filter(|e| e.is_expired_on(today)).count();

    Ok(SystemInfo {
        domain: storage
            .domain()?
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string()),
        listen: config.listen,
        api_port,
        credential_count: config.auth.config.len(),
        active_count: ledger.len() - expired_count,
        expired_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::seed_config_root;
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use zivpn_storage::StoragePaths;
    use zivpn_traits::FixedClock;

    #[test]
    fn test_counts_active_and_expired() {
        let dir = tempdir().unwrap();
        seed_config_root(dir.path()).unwrap();
        std::fs::write(
            dir.path().join("users.db"),
            "alice | 2024-01-31\nbob | 2023-12-01\ncarol|2024-01-01\n",
        )
        .unwrap();
        let storage = Storage::new(StoragePaths::new(dir.path()));
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let info = system_info(&storage, &clock, 8080).unwrap();

        assert_eq!(info.domain, "vpn.example.com");
        assert_eq!(info.listen, ":5667");
        assert_eq!(info.api_port, 8080);
        assert_eq!(info.credential_count, 0);
        assert_eq!(info.active_count, 2);
        assert_eq!(info.expired_count, 1);
    }
}
