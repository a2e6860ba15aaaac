// Connection probe tests against a mock OpenAI-compatible server
// Run with: cargo test -p modelgate-control-plane --test probe_test

use std::sync::Arc;
use std::time::Duration;

use modelgate_control_plane::services::ConnectionProber;
use modelgate_control_plane::AppContext;
use modelgate_core::{ModelConfigInput, ProbeProfile, ProbeResult, ProviderType};
use modelgate_openai::OpenAiClient;
use modelgate_storage::{EncryptionService, MasterKey, StorageBackend};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> ConnectionProber {
    ConnectionProber::new(Arc::new(OpenAiClient::new()), Duration::from_secs(30))
}

fn profile(server: &MockServer, api_key: &str) -> ProbeProfile {
    ProbeProfile {
        base_url: format!("{}/v1", server.uri()),
        model_id: "gpt-4o-mini".to_string(),
        api_key: api_key.to_string(),
    }
}

async fn mock_status(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_probe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = prober()
        .probe(
            &profile(&server, "sk-test"),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_success());
    let response = result.to_response();
    assert_eq!(response.message, "Connection successful");
    assert!(response.details.unwrap()["responseTime"].ends_with("ms"));
}

#[tokio::test]
async fn test_unauthorized_is_auth_failed() {
    let server = MockServer::start().await;
    mock_status(
        &server,
        401,
        json!({"error": {"message": "Incorrect API key provided: sk-bad", "code": "invalid_api_key"}}),
    )
    .await;

    let result = prober()
        .probe(
            &profile(&server, "sk-bad"),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result, ProbeResult::AuthFailed);
    let response = result.to_response();
    assert!(!response.success);
    assert_eq!(response.message, "Authentication failed");
    assert_eq!(response.error_details.as_deref(), Some("Invalid API key"));
}

#[tokio::test]
async fn test_unknown_model_and_rate_limit() {
    let server = MockServer::start().await;
    mock_status(&server, 404, json!({"error": {"code": "model_not_found"}})).await;
    let result = prober()
        .probe(
            &profile(&server, "sk-test"),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
    assert_eq!(result, ProbeResult::ModelNotFound);

    let server = MockServer::start().await;
    mock_status(&server, 429, json!({"error": {"type": "rate_limit_exceeded"}})).await;
    let result = prober()
        .probe(
            &profile(&server, "sk-test"),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
    assert_eq!(result, ProbeResult::RateLimited);
}

#[tokio::test]
async fn test_server_error_is_other_without_credential() {
    let server = MockServer::start().await;
    mock_status(
        &server,
        500,
        json!({"error": "upstream exploded while using key sk-live-abcdef"}),
    )
    .await;

    let result = prober()
        .probe(
            &profile(&server, "sk-live-abcdef"),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;

    match result {
        ProbeResult::Other { message } => {
            assert!(message.contains("500"));
            assert!(!message.contains("sk-live-abcdef"));
        }
        other => panic!("expected Other, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let result = prober()
        .probe(
            &profile(&server, "sk-test"),
            Duration::from_millis(200),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result, ProbeResult::Timeout);
    assert_eq!(result.to_response().message, "Connection timeout");
}

#[tokio::test]
async fn test_cancellation_during_probe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = prober()
        .probe(&profile(&server, "sk-test"), Duration::from_secs(10), &cancel)
        .await;

    assert_eq!(
        result,
        ProbeResult::Other {
            message: "Connection test cancelled".to_string()
        }
    );
}

#[tokio::test]
async fn test_probe_saved_uses_decrypted_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-stored-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Hi"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = AppContext::new(
        StorageBackend::in_memory(),
        EncryptionService::new(&MasterKey::generate()),
        Arc::new(OpenAiClient::new()),
        Duration::from_secs(5),
    );
    let config = ctx
        .model_configs
        .create(ModelConfigInput {
            name: "Mock".to_string(),
            provider: ProviderType::Openai,
            base_url: format!("{}/v1", server.uri()),
            model_id: "gpt-4o-mini".to_string(),
            api_key: "sk-stored-key".to_string(),
            is_default: true,
        })
        .await
        .unwrap();

    let result = ctx
        .prober
        .probe_saved(
            &ctx.model_configs,
            config.id,
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(result.is_success());
}
