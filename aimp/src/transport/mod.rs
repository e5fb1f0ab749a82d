pub mod jsonrpc;
pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use http::HttpTransport;
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestIds};
pub use mock::ScriptedTransport;

/// Error object carried by a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcFault {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for RpcFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Error types for transport operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("RPC fault {0}")]
    Fault(RpcFault),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout occurred during request: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl TransportError {
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        TransportError::Fault(RpcFault {
            code,
            message: message.into(),
        })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::InvalidResponse(err.to_string())
    }
}

/// A single method invocation as it goes over the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    /// Wire name of the method.
    pub method: String,
    pub params: Value,
    /// Long-poll calls are answered only when a player event fires, so the
    /// ordinary request timeout must not apply to them.
    pub long_poll: bool,
}

impl RpcCall {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            long_poll: false,
        }
    }

    pub fn long_poll(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            long_poll: true,
        }
    }
}

/// Generic JSON-RPC client used by the player proxy.
///
/// Implementations return the `result` member of a successful response, or
/// [`TransportError::Fault`] when the server answered with an error object.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, call: RpcCall) -> Result<Value, TransportError>;
}
