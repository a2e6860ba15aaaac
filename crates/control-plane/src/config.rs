// Control-plane configuration
//
// Loaded from environment variables (after an optional .env file). The master
// key is not part of this struct: it is resolved separately by MasterKey so it
// never sits in a Debug-printable config value.

use std::env;
use std::time::Duration;

use crate::services::LegacyCredential;

/// Default probe deadline in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL URL. None runs the in-memory dev backend.
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Prefix for API routes, e.g. "/api"
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
    pub probe_timeout: Duration,
    /// Plaintext OpenAI key from older single-key deployments, for bootstrap
    pub legacy_credential: Option<LegacyCredential>,
}

impl AppConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `DATABASE_URL`: PostgreSQL connection string (unset: in-memory dev mode)
    /// - `BIND_ADDR`: HTTP listen address (default: 0.0.0.0:8080)
    /// - `API_PREFIX`: Prefix for API routes (default: empty)
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origin list (default: none)
    /// - `PROBE_TIMEOUT_SECS`: Connection test deadline (default: 30)
    /// - `OPENAI_API_KEY` / `OPENAI_BASE_URL`: Legacy credential for bootstrap
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL");
        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let api_prefix = get("API_PREFIX").unwrap_or_default();

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let probe_timeout = get("PROBE_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS));

        let legacy_credential = get("OPENAI_API_KEY")
            .filter(|key| !key.is_empty())
            .map(|api_key| LegacyCredential {
                api_key,
                base_url: non_empty("OPENAI_BASE_URL"),
            });

        Self {
            database_url,
            bind_addr,
            api_prefix,
            cors_allowed_origins,
            probe_timeout,
            legacy_credential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.api_prefix, "");
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
        assert!(config.legacy_credential.is_none());
    }

    #[test]
    fn test_values_are_read() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/modelgate"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("API_PREFIX", "/api"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example.com, https://b.example.com,"),
            ("PROBE_TIMEOUT_SECS", "5"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ]);

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/modelgate"));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(config.probe_timeout, Duration::from_secs(5));

        let legacy = config.legacy_credential.unwrap();
        assert_eq!(legacy.api_key, "sk-test");
        assert_eq!(legacy.base_url.as_deref(), Some("http://localhost:11434/v1"));
    }

    #[test]
    fn test_empty_legacy_key_is_absent() {
        assert!(config(&[("OPENAI_API_KEY", "")]).legacy_credential.is_none());
    }

    #[test]
    fn test_invalid_probe_timeout_falls_back() {
        assert_eq!(
            config(&[("PROBE_TIMEOUT_SECS", "soon")]).probe_timeout,
            Duration::from_secs(30)
        );
        assert_eq!(
            config(&[("PROBE_TIMEOUT_SECS", "0")]).probe_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_debug_hides_legacy_key() {
        let config = config(&[("OPENAI_API_KEY", "sk-very-secret")]);
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
