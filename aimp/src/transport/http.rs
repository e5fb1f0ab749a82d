use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestIds};
use super::{RpcCall, RpcTransport, TransportError};
use crate::config::ClientConfig;

/// JSON-RPC over HTTP POST to the plugin's fixed endpoint.
pub struct HttpTransport {
    http_client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    subscription_timeout: Option<Duration>,
    ids: RequestIds,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::Configuration)?;

        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint_url(),
            request_timeout: config.request_timeout,
            subscription_timeout: config.subscription_timeout,
            ids: RequestIds::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_for(&self, call: &RpcCall) -> Option<Duration> {
        if call.long_poll {
            self.subscription_timeout
        } else {
            Some(self.request_timeout)
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, call: RpcCall) -> Result<Value, TransportError> {
        let id = self.ids.next();
        let body = JsonRpcRequest::new(&call.method, &call.params, id);

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(timeout) = self.timeout_for(&call) {
            request = request.timeout(timeout);
        }

        log::debug!("-> {} #{} {}", call.method, id, call.params);

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() && text.trim().is_empty() {
            return Err(TransportError::Http(format!(
                "{} answered {}",
                self.endpoint, status
            )));
        }

        let response = JsonRpcResponse::parse(&text)?;
        if !response.id_matches(id) {
            log::warn!(
                "Response id {} does not match request #{} ({})",
                response.id,
                id,
                call.method
            );
        }

        let result = response.into_result();
        match &result {
            Ok(value) => log::debug!("<- {} #{} {}", call.method, id, value),
            Err(err) => log::debug!("<- {} #{} failed: {}", call.method, id, err),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_from_config() {
        let transport = HttpTransport::new(&ClientConfig::new("http://127.0.0.1:3333")).unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:3333/RPC_JSON");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let error = match HttpTransport::new(&ClientConfig::new("127.0.0.1:3333")) {
            Err(error) => error,
            Ok(_) => panic!("a base URL without scheme must be rejected"),
        };
        assert!(matches!(error, TransportError::Configuration(_)));
        assert!(error.to_string().starts_with("Invalid configuration: "));
    }

    #[test]
    fn test_long_poll_has_no_timeout_by_default() {
        let config = ClientConfig::default().with_request_timeout(Duration::from_secs(3));
        let transport = HttpTransport::new(&config).unwrap();

        let ordinary = RpcCall::new("volume", json!({}));
        let long_poll = RpcCall::long_poll("subscribe", json!({ "event": "play_state_change" }));

        assert_eq!(transport.timeout_for(&ordinary), Some(Duration::from_secs(3)));
        assert_eq!(transport.timeout_for(&long_poll), None);
    }
}
