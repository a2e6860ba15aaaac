// Application context
// Decision: Built once in main and handed to every component; no process-wide globals

use std::sync::Arc;
use std::time::Duration;

use modelgate_core::CompletionClient;
use modelgate_storage::{EncryptionService, StorageBackend, UsageCounter};
use tokio_util::sync::CancellationToken;

use crate::services::{ConnectionProber, ModelConfigService};

#[derive(Clone)]
pub struct AppContext {
    pub model_configs: Arc<ModelConfigService>,
    pub prober: Arc<ConnectionProber>,
    /// Cancelled on shutdown; in-flight probes observe child tokens
    pub shutdown: CancellationToken,
}

impl AppContext {
    /// Wire services over a backend, counting usage in the same backend
    pub fn new(
        db: StorageBackend,
        encryption: EncryptionService,
        client: Arc<dyn CompletionClient>,
        probe_timeout: Duration,
    ) -> Self {
        let usage: Arc<dyn UsageCounter> = Arc::new(db.clone());
        Self::with_usage_counter(db, encryption, usage, client, probe_timeout)
    }

    pub fn with_usage_counter(
        db: StorageBackend,
        encryption: EncryptionService,
        usage: Arc<dyn UsageCounter>,
        client: Arc<dyn CompletionClient>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            model_configs: Arc::new(ModelConfigService::new(db, Arc::new(encryption), usage)),
            prober: Arc::new(ConnectionProber::new(client, probe_timeout)),
            shutdown: CancellationToken::new(),
        }
    }
}
