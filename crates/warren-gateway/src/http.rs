//! HTTP transport for the gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use warren_settings::GatewaySettings;

use crate::client::Gateway;
use crate::errors::{GatewayError, Result};
use crate::types::{RpcRequest, RpcResponse};

/// Gateway reached over HTTP: envelopes are POSTed to `<url>/rpc`.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Create a transport for `base_url` with an optional bearer token.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("warren/0.1")
            .build()
            .map_err(|e| GatewayError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/rpc", base_url.trim_end_matches('/')),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Create a transport from the `gateway` settings section.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self> {
        Self::new(&settings.url, settings.token.clone())
    }

    /// Full RPC endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, method: &str, params: Value, timeout: Duration) -> Result<Value> {
        let request = RpcRequest::new(method, params);
        debug!(method, id = %request.id, endpoint = %self.endpoint, "gateway call");

        let mut builder = self.client.post(&self.endpoint).timeout(timeout).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                GatewayError::Transport {
                    message: format!("request failed: {e}"),
                }
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Transport {
            message: format!("failed to read response body: {e}"),
        })?;

        // Error responses may still carry a structured envelope.
        match serde_json::from_str::<RpcResponse>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if !status.is_success() => Err(GatewayError::Transport {
                message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
            }),
            Err(e) => Err(GatewayError::Decode {
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn endpoint_joins_rpc_path() {
        let gw = HttpGateway::new("http://127.0.0.1:18789/", None).unwrap();
        assert_eq!(gw.endpoint(), "http://127.0.0.1:18789/rpc");
    }

    #[test]
    fn from_settings_uses_url() {
        let gw = HttpGateway::from_settings(&GatewaySettings::default()).unwrap();
        assert_eq!(gw.endpoint(), "http://127.0.0.1:18789/rpc");
    }

    #[tokio::test]
    async fn posts_envelope_and_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "method": "sessions.patch",
                "params": {"key": "k", "spawnDepth": 1}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "x",
                "success": true,
                "result": {"ok": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), Some("secret".into())).unwrap();
        let result = gw
            .call("sessions.patch", json!({"key": "k", "spawnDepth": 1}), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result, json!({"ok": true}));
    }

    #[tokio::test]
    async fn mirrors_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"idempotencyKey": "idem-7"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": {"runId": "run-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), None).unwrap();
        let result = gw
            .call("agent", json!({"idempotencyKey": "idem-7"}), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result["runId"], "run-1");
    }

    #[tokio::test]
    async fn structured_error_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "id": "x",
                "success": false,
                "error": {"code": "MODEL_NOT_ALLOWED", "message": "model not allowed: a/b"}
            })))
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), None).unwrap();
        let err = gw
            .call("sessions.patch", json!({"key": "k", "model": "a/b"}), TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.is_model_rejection());
        assert_eq!(err.message(), "model not allowed: a/b");
    }

    #[tokio::test]
    async fn plain_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), None).unwrap();
        let err = gw.call("agent", json!({}), TIMEOUT).await.unwrap_err();
        assert_matches!(err, GatewayError::Transport { message } if message.contains("502"));
    }

    #[tokio::test]
    async fn garbage_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), None).unwrap();
        let err = gw.call("agent", json!({}), TIMEOUT).await.unwrap_err();
        assert_matches!(err, GatewayError::Decode { .. });
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gw = HttpGateway::new(&server.uri(), None).unwrap();
        let err = gw
            .call("agent", json!({}), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::Timeout { timeout_ms: 100 });
    }
}
