use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use tracing::debug;

use crate::config::RelayEndpoint;
use crate::error::RelayError;

type HmacSha256 = Hmac<Sha256>;

/// Posts payloads to mirror endpoints. One instance is shared by the relay
/// for all endpoints.
pub struct WebhookSender {
    http_client: Client,
}

impl WebhookSender {
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
        }
    }

    fn sign_payload(&self, payload: &str, secret: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        let result = mac.finalize();
        hex::encode(result.into_bytes())
    }

    /// Send one payload to one endpoint. A non-success status is an error;
    /// the caller decides that errors are logged and swallowed.
    pub async fn post(
        &self,
        endpoint: &RelayEndpoint,
        payload: &serde_json::Value,
    ) -> Result<(), RelayError> {
        if endpoint.url.is_empty() {
            return Err(RelayError::InvalidConfig("missing endpoint url".into()));
        }

        let payload_str = serde_json::to_string(payload)
            .map_err(|e| RelayError::SendFailed(e.to_string()))?;

        let mut request = self
            .http_client
            .post(&endpoint.url)
            .header("Content-Type", "application/json");

        if let Some(headers) = &endpoint.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        if let Some(secret) = &endpoint.secret {
            let signature = self.sign_payload(&payload_str, secret);
            request = request.header("X-Signature-256", format!("sha256={signature}"));
        }

        let response = request
            .body(payload_str)
            .send()
            .await
            .map_err(|e| RelayError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            debug!(url = %endpoint.url, "Webhook delivered");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RelayError::SendFailed(format!(
                "{status}: {body}"
            )))
        }
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_signature_is_deterministic() {
        let sender = WebhookSender::new();
        let signature = sender.sign_payload(r#"{"test": "data"}"#, "secret123");
        assert!(!signature.is_empty());
        let signature2 = sender.sign_payload(r#"{"test": "data"}"#, "secret123");
        assert_eq!(signature, signature2);
    }

    #[test]
    fn test_webhook_signature_varies_with_secret() {
        let sender = WebhookSender::new();
        let a = sender.sign_payload("{}", "secret-a");
        let b = sender.sign_payload("{}", "secret-b");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_url_is_config_error() {
        let sender = WebhookSender::new();
        let err = sender
            .post(&RelayEndpoint::default(), &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }
}
