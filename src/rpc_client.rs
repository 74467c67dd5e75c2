//! JSON-RPC 2.0 transport to the application's local RPC endpoint
//!
//! Every call is one HTTP POST with no retry. Failures are classified into
//! [`RpcClientError`] variants so front ends can report them uniformly.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{config::Config, errors::RpcClientError};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// An `error` member wins over `result`; a response with neither is an
    /// empty success.
    pub fn into_result(self) -> Result<Value, RpcClientError> {
        if let Some(error) = self.error {
            return Err(RpcClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(self.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, method: &str, params: Value) -> Result<Value, RpcClientError>;
}

#[derive(Debug)]
pub struct HttpRpcClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rpc_url.clone(), config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        let request = self.build_request(method, params);
        debug!(method = %request.method, id = request.id, endpoint = %self.endpoint, "sending rpc request");

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|err| {
            let classified = classify_send_error(err);
            warn!(method = %request.method, error = %classified, "rpc request failed");
            classified
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(method = %request.method, status = status.as_u16(), "rpc server returned http error");
            return Err(RpcClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: JsonRpcResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                RpcClientError::NoResponse
            } else {
                RpcClientError::Transport(err)
            }
        })?;

        let result = body.into_result();
        if let Err(RpcClientError::Rpc { code, message }) = &result {
            debug!(method = %request.method, code = *code, message = %message, "rpc server returned error");
        }
        result
    }
}

fn classify_send_error(err: reqwest::Error) -> RpcClientError {
    if err.is_builder() {
        return RpcClientError::request_setup(err.to_string());
    }

    if err.is_connect() || err.is_timeout() || err.is_request() {
        return RpcClientError::NoResponse;
    }

    RpcClientError::Transport(err)
}
