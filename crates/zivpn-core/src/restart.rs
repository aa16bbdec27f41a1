//! Fire-and-forget service restarts.
//!
//! Mutating operations call [`RestartNotifier::notify`] and return without
//! waiting. The outcome is only ever logged. Short-lived processes such as
//! the CLI call [`RestartNotifier::settle`] before exiting so the detached
//! restarts are not dropped with the runtime.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{info, warn};
use zivpn_traits::ServiceController;

#[derive(Clone)]
pub struct RestartNotifier {
    controller: Arc<dyn ServiceController>,
    services: Arc<[String]>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl RestartNotifier {
    pub fn new(controller: Arc<dyn ServiceController>, services: Vec<String>) -> Self {
        Self {
            controller,
            services: services.into(),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Restart every configured service, in order, on a detached task.
    pub fn notify(&self, reason: &'static str) {
        let controller = self.controller.clone();
        let services = self.services.clone();
        let handle = tokio::spawn(async move {
            for service in services.iter() {
                match controller.restart(service).await {
                    Ok(output) if output.success => {
                        info!(service = %service, reason, "Service restarted");
                    }
                    Ok(output) => {
                        warn!(
                            service = %service,
                            reason,
                            output = %output.diagnostic(),
                            "Service restart failed"
                        );
                    }
                    Err(e) => {
                        warn!(service = %service, reason, error = %e, "Service restart failed");
                    }
                }
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for every restart scheduled so far.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = self.lock_pending().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Restart task aborted");
            }
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
