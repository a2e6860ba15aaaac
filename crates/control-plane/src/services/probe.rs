// Connectivity prober
//
// Sends one minimal completion with a transient profile and classifies the
// outcome. Never reads or writes the store, except probe_saved which resolves
// a stored configuration first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use modelgate_core::probe::{PROBE_MAX_TOKENS, PROBE_PROMPT};
use modelgate_core::{
    classify_failure, CompletionClient, CompletionRequest, ProbeProfile, ProbeResult, Result,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ModelConfigService;

const CANCELLED_MESSAGE: &str = "Connection test cancelled";

pub struct ConnectionProber {
    client: Arc<dyn CompletionClient>,
    default_timeout: Duration,
}

impl ConnectionProber {
    pub fn new(client: Arc<dyn CompletionClient>, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Probe a transient profile, bounded by `timeout` and `cancel`
    pub async fn probe(
        &self,
        profile: &ProbeProfile,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeResult {
        let request = CompletionRequest {
            base_url: profile.base_url.clone(),
            api_key: profile.api_key.clone(),
            model: profile.model_id.clone(),
            prompt: PROBE_PROMPT.to_string(),
            max_tokens: PROBE_MAX_TOKENS,
        };

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => ProbeResult::Other {
                message: CANCELLED_MESSAGE.to_string(),
            },
            outcome = tokio::time::timeout(timeout, self.client.complete(&request)) => match outcome {
                Err(_elapsed) => ProbeResult::Timeout,
                Ok(Ok(_)) => ProbeResult::Success {
                    latency: started.elapsed(),
                },
                Ok(Err(e)) => classify_failure(&e, &profile.api_key),
            },
        };

        match &result {
            ProbeResult::Success { latency } => {
                tracing::info!(model = %profile.model_id, latency_ms = latency.as_millis() as u64, "Connection test succeeded");
            }
            failure => {
                if let Some(err) = failure.error() {
                    tracing::warn!(model = %profile.model_id, error = %err, "Connection test failed");
                }
            }
        }

        result
    }

    /// Probe a stored configuration with its decrypted credential
    pub async fn probe_saved(
        &self,
        service: &ModelConfigService,
        id: Uuid,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ProbeResult> {
        let resolved = service.resolve(id).await?;
        let profile = ProbeProfile {
            base_url: resolved.base_url,
            model_id: resolved.model_id,
            api_key: resolved.api_key,
        };
        Ok(self.probe(&profile, timeout, cancel).await)
    }
}
