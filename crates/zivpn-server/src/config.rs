use anyhow::Result;
use tracing::warn;
use zivpn_core::AppCore;

/// HTTP listener settings resolved at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Read once; editing the key file takes effect on restart.
    pub api_key: Option<String>,
}

impl ServerConfig {
    pub fn from_core(core: &AppCore) -> Result<Self> {
        let api_key = core.api_key()?;
        if api_key.is_none() {
            warn!(
                path = %core.storage.paths().api_key_file().display(),
                "API key file missing or empty, /api routes are unauthenticated"
            );
        }
        Ok(Self {
            host: core.settings.server.host.clone(),
            port: core.settings.server.port,
            api_key,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
