use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RpcFault, TransportError};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a Value,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcFault>,
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn parse(body: &str) -> Result<Self, TransportError> {
        serde_json::from_str(body).map_err(|e| {
            TransportError::InvalidResponse(format!("not a JSON-RPC response: {}", e))
        })
    }

    /// Returns the result, or the fault if the server reported one.
    ///
    /// Methods with nothing to return answer with an absent or `null` result,
    /// which maps to `Value::Null`.
    pub fn into_result(self) -> Result<Value, TransportError> {
        match self.error {
            Some(fault) => Err(TransportError::Fault(fault)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }

    pub fn id_matches(&self, expected: u64) -> bool {
        self.id.as_u64() == Some(expected)
    }
}

/// Monotonic request id source shared by all calls of one transport.
#[derive(Debug, Default)]
pub struct RequestIds(AtomicU64);

impl RequestIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}
