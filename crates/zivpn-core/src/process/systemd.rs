use std::time::Duration;

use async_trait::async_trait;
use zivpn_traits::{ServiceController, ToolOutput};

use super::run_tool;
use crate::settings::ServiceSettings;

/// [`ServiceController`] that shells out to `systemctl restart`.
#[derive(Debug, Clone)]
pub struct SystemdController {
    bin: String,
    timeout: Duration,
}

impl SystemdController {
    pub fn new(settings: &ServiceSettings) -> Self {
        Self {
            bin: settings.systemctl_bin.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl ServiceController for SystemdController {
    async fn restart(&self, service: &str) -> std::io::Result<ToolOutput> {
        run_tool(&self.bin, ["restart", service], self.timeout).await
    }
}
