//! Admin backend settings.
//!
//! Loaded from a TOML file (`ZIVPN_CONFIG`, else `/etc/zivpn/admin.toml`
//! when present), then overridden by `ZIVPN_*` environment variables.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use zivpn_storage::paths::DEFAULT_CONFIG_ROOT;

const CONFIG_ENV: &str = "ZIVPN_CONFIG";
const DEFAULT_SETTINGS_FILE: &str = "/etc/zivpn/admin.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backup: BackupSettings,
    #[serde(default)]
    pub services: ServiceSettings,
    #[serde(default)]
    pub auto_backup: AutoBackupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub config_root: PathBuf,
    pub staging_dir: PathBuf,
    pub log_dir: PathBuf,
    pub cron_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            config_root: PathBuf::from(DEFAULT_CONFIG_ROOT),
            staging_dir: env::temp_dir(),
            log_dir: PathBuf::from("/var/log/zivpn"),
            cron_file: PathBuf::from("/etc/cron.d/zivpn-backup"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    /// rclone `remote:path` holding the archives.
    pub remote: String,
    pub rclone_bin: String,
    pub retention_days: u32,
    pub command_timeout_secs: u64,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            remote: "drive:ZIVPN-BACKUP".to_string(),
            rclone_bin: "rclone".to_string(),
            retention_days: 7,
            command_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Restarted in order after every credential mutation or restore.
    pub restart: Vec<String>,
    pub systemctl_bin: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            restart: vec![
                "zivpn".to_string(),
                "zivpn-bot".to_string(),
                "zivpn-api".to_string(),
            ],
            systemctl_bin: "systemctl".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoBackupSettings {
    pub default_schedule: String,
    pub command: String,
}

impl Default for AutoBackupSettings {
    fn default() -> Self {
        Self {
            default_schedule: "0 3 * * *".to_string(),
            command: "zivpn backup create && zivpn backup cleanup".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let mut settings = match settings_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path.display(), err))?;
        toml::from_str(&contents)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), err))
    }

    /// Settings rooted at `config_root`, defaults elsewhere.
    pub fn with_root(config_root: impl Into<PathBuf>) -> Self {
        let mut settings = Self::default();
        settings.paths.config_root = config_root.into();
        settings
    }

    fn apply_env(&mut self) {
        if let Some(dir) = env_value("ZIVPN_DIR") {
            self.paths.config_root = PathBuf::from(dir);
        }
        if let Some(host) = env_value("ZIVPN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("ZIVPN_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(remote) = env_value("ZIVPN_RCLONE_REMOTE") {
            self.backup.remote = remote;
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn settings_file() -> Option<PathBuf> {
    if let Some(path) = env_value(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = Path::new(DEFAULT_SETTINGS_FILE);
    default.exists().then(|| default.to_path_buf())
}
