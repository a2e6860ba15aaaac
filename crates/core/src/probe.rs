// Connectivity probe types and outcome classification
//
// The upstream APIs do not report structured error codes uniformly, so a
// failed probe is classified from the error text with an ordered list of
// substring markers. The first matching class wins; anything unmatched is
// Other, so unfamiliar error text can never fail the classification itself.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::ConfigError;
use crate::llm::CompletionError;

/// Prompt sent by every probe
pub const PROBE_PROMPT: &str = "Hello";

/// Token cap for probe completions
pub const PROBE_MAX_TOKENS: u32 = 10;

const TIMEOUT_MARKERS: &[&str] = &["context deadline exceeded", "deadline has elapsed", "timed out"];
const AUTH_MARKERS: &[&str] = &["401", "unauthorized", "invalid_api_key"];
const MODEL_MARKERS: &[&str] = &["404", "model_not_found"];
const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate_limit"];

/// Transient connection profile used only for a probe. Never persisted.
#[derive(Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProbeProfile {
    /// Base URL of an OpenAI-compatible API. Empty for the provider default.
    #[serde(default)]
    pub base_url: String,
    /// Model identifier to probe.
    #[cfg_attr(feature = "openapi", schema(example = "gpt-4o-mini"))]
    pub model_id: String,
    /// Plaintext API key, used for this one call only.
    #[serde(default)]
    pub api_key: String,
}

impl ProbeProfile {
    /// Reject profiles that could not name a model to call
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::validation("modelId is required"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProbeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeProfile")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Classified outcome of one probe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Success { latency: Duration },
    Timeout,
    AuthFailed,
    ModelNotFound,
    RateLimited,
    /// Unclassified failure; the message has the probed credential scrubbed
    Other { message: String },
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }

    /// The failure as a typed error, or None on success
    pub fn error(&self) -> Option<ConfigError> {
        match self {
            ProbeResult::Success { .. } => None,
            ProbeResult::Timeout => Some(ConfigError::ProbeTimeout),
            ProbeResult::AuthFailed => Some(ConfigError::ProbeAuthFailed),
            ProbeResult::ModelNotFound => Some(ConfigError::ProbeModelNotFound),
            ProbeResult::RateLimited => Some(ConfigError::ProbeRateLimited),
            ProbeResult::Other { message } => Some(ConfigError::ProbeOther(message.clone())),
        }
    }

    /// Render for API clients. Only the documented generic text is used for
    /// the auth, timeout, model and rate-limit classes.
    pub fn to_response(&self) -> ProbeResponse {
        match self {
            ProbeResult::Success { latency } => {
                let mut details = BTreeMap::new();
                details.insert("responseTime".to_string(), format_latency(*latency));
                details.insert("modelAvailable".to_string(), "true".to_string());
                ProbeResponse {
                    success: true,
                    message: "Connection successful".to_string(),
                    details: Some(details),
                    error_details: None,
                }
            }
            ProbeResult::Timeout => {
                ProbeResponse::failure("Connection timeout", "Request timed out")
            }
            ProbeResult::AuthFailed => {
                ProbeResponse::failure("Authentication failed", "Invalid API key")
            }
            ProbeResult::ModelNotFound => ProbeResponse::failure(
                "Invalid model ID",
                "The specified model does not exist",
            ),
            ProbeResult::RateLimited => ProbeResponse::failure(
                "Rate limit exceeded",
                "Too many requests, please try again later",
            ),
            ProbeResult::Other { message } => {
                ProbeResponse::failure("Connection failed", message.clone())
            }
        }
    }
}

/// Wire shape of a probe result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl ProbeResponse {
    fn failure(message: &str, details: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            details: None,
            error_details: Some(details.into()),
        }
    }
}

/// Classify a failed completion call.
///
/// `api_key` is the credential that was probed; it is scrubbed from any raw
/// text that ends up in `Other`.
pub fn classify_failure(error: &CompletionError, api_key: &str) -> ProbeResult {
    if error.is_timeout() {
        return ProbeResult::Timeout;
    }

    if let CompletionError::Status { status, .. } = error {
        match *status {
            401 => return ProbeResult::AuthFailed,
            404 => return ProbeResult::ModelNotFound,
            429 => return ProbeResult::RateLimited,
            _ => {}
        }
    }

    let text = error.to_string();
    let lowered = text.to_lowercase();
    let matches_any = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));

    if matches_any(TIMEOUT_MARKERS) {
        ProbeResult::Timeout
    } else if matches_any(AUTH_MARKERS) {
        ProbeResult::AuthFailed
    } else if matches_any(MODEL_MARKERS) {
        ProbeResult::ModelNotFound
    } else if matches_any(RATE_LIMIT_MARKERS) {
        ProbeResult::RateLimited
    } else {
        ProbeResult::Other {
            message: scrub(&text, api_key),
        }
    }
}

/// Remove every occurrence of the credential from `text`
pub fn scrub(text: &str, secret: &str) -> String {
    // Very short values would shred unrelated text
    if secret.len() < 4 {
        return text.to_string();
    }
    text.replace(secret, "[REDACTED]")
}

fn format_latency(latency: Duration) -> String {
    format!("{}ms", latency.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> CompletionError {
        CompletionError::Status {
            status: code,
            body: body.to_string(),
        }
    }

    fn transport(message: &str) -> CompletionError {
        CompletionError::Transport {
            message: message.to_string(),
            timeout: false,
        }
    }

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(classify_failure(&status(401, "{}"), "sk"), ProbeResult::AuthFailed);
        assert_eq!(classify_failure(&status(404, "{}"), "sk"), ProbeResult::ModelNotFound);
        assert_eq!(classify_failure(&status(429, "{}"), "sk"), ProbeResult::RateLimited);
    }

    #[test]
    fn test_classify_error_codes_in_body() {
        let body = r#"{"error":{"code":"invalid_api_key","message":"Incorrect API key provided"}}"#;
        assert_eq!(classify_failure(&status(400, body), "sk"), ProbeResult::AuthFailed);

        let body = r#"{"error":{"code":"model_not_found"}}"#;
        assert_eq!(classify_failure(&status(400, body), "sk"), ProbeResult::ModelNotFound);

        let body = r#"{"error":{"type":"rate_limit_error"}}"#;
        assert_eq!(classify_failure(&status(400, body), "sk"), ProbeResult::RateLimited);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(
            classify_failure(&transport("Unauthorized"), "sk"),
            ProbeResult::AuthFailed
        );
    }

    #[test]
    fn test_classify_timeouts() {
        let err = CompletionError::Transport {
            message: "operation timed out".to_string(),
            timeout: true,
        };
        assert_eq!(classify_failure(&err, "sk"), ProbeResult::Timeout);
        assert_eq!(
            classify_failure(&transport("context deadline exceeded"), "sk"),
            ProbeResult::Timeout
        );
    }

    #[test]
    fn test_classify_order_auth_before_model() {
        // Both markers present: the earlier class wins
        assert_eq!(
            classify_failure(&status(401, "model_not_found"), "sk"),
            ProbeResult::AuthFailed
        );
    }

    #[test]
    fn test_status_code_wins_over_body_markers() {
        let body = r#"{"error":{"code":"invalid_api_key"}}"#;
        assert_eq!(classify_failure(&status(429, body), "sk"), ProbeResult::RateLimited);
        assert_eq!(classify_failure(&status(404, body), "sk"), ProbeResult::ModelNotFound);
    }

    #[test]
    fn test_unknown_error_is_other_and_scrubbed() {
        let err = transport("connection refused while sending key sk-live-abcdef");
        match classify_failure(&err, "sk-live-abcdef") {
            ProbeResult::Other { message } => {
                assert!(message.contains("connection refused"));
                assert!(!message.contains("sk-live-abcdef"));
                assert!(message.contains("[REDACTED]"));
            }
            other => panic!("expected Other, got {:?}", other),
        }
    }

    #[test]
    fn test_response_rendering() {
        let ok = ProbeResult::Success {
            latency: Duration::from_millis(120),
        }
        .to_response();
        assert!(ok.success);
        assert_eq!(ok.message, "Connection successful");
        let details = ok.details.unwrap();
        assert_eq!(details["responseTime"], "120ms");
        assert_eq!(details["modelAvailable"], "true");

        let auth = ProbeResult::AuthFailed.to_response();
        assert!(!auth.success);
        assert_eq!(auth.message, "Authentication failed");
        assert_eq!(auth.error_details.as_deref(), Some("Invalid API key"));

        let json = serde_json::to_value(ProbeResult::Timeout.to_response()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorDetails"], "Request timed out");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_result_to_error() {
        assert!(ProbeResult::Success {
            latency: Duration::ZERO
        }
        .error()
        .is_none());
        assert!(matches!(
            ProbeResult::RateLimited.error(),
            Some(ConfigError::ProbeRateLimited)
        ));
        assert!(matches!(
            ProbeResult::Other {
                message: "boom".into()
            }
            .error(),
            Some(ConfigError::ProbeOther(m)) if m == "boom"
        ));
    }

    #[test]
    fn test_profile_requires_model_id() {
        let profile: ProbeProfile =
            serde_json::from_str(r#"{"modelId":"  ","apiKey":"sk-test"}"#).unwrap();
        assert!(matches!(profile.validate(), Err(ConfigError::Validation(_))));

        let profile: ProbeProfile = serde_json::from_str(r#"{"modelId":"gpt-4o"}"#).unwrap();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_profile_debug_redacts_key() {
        let profile: ProbeProfile =
            serde_json::from_str(r#"{"modelId":"gpt-4o","apiKey":"sk-secret-value"}"#).unwrap();
        assert!(profile.base_url.is_empty());
        assert!(!format!("{:?}", profile).contains("sk-secret-value"));
    }
}
