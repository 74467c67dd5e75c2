//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC messages (single or batched), negotiates the protocol
//! version on `initialize`, and routes tool calls to the notes tools.

use rust_mcp_sdk::schema::{
    CallToolRequest, Implementation, InitializeRequest, InitializeResult, JsonrpcMessage,
    JsonrpcRequest, ListToolsRequest, ListToolsResult, PingRequest, ServerCapabilities,
    ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::info;

use crate::domain::tools::{build_tools_list, handle_tools_call};
use crate::mcp::rpc::{
    app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result,
    request_id_to_value, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::{errors::AppError, AppState};

/// Newest first; the first entry is offered when the client asks for a
/// version this server does not know.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

const SERVER_INSTRUCTIONS: &str =
    "Read and edit the notes stored in the connected application. Use list_notes to discover note ids.";

/// Handles one decoded payload, which may be a batch. Returns `None` when
/// nothing needs to be sent back (notifications only).
pub async fn handle_json_rpc_payload(state: &AppState, payload: Value) -> Option<Value> {
    let Some(batch) = payload.as_array() else {
        return handle_json_rpc_value(state, payload).await;
    };

    if batch.is_empty() {
        return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
    }

    let mut responses = Vec::new();
    for item in batch {
        if let Some(response) = handle_json_rpc_value(state, item.clone()).await {
            responses.push(response);
        }
    }

    if responses.is_empty() {
        None
    } else {
        Some(Value::Array(responses))
    }
}

pub async fn handle_json_rpc_value(state: &AppState, payload: Value) -> Option<Value> {
    if !payload.is_object() {
        return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
    }

    let request_id = payload.get("id").cloned();
    let parsed: JsonrpcMessage = match serde_json::from_value(payload) {
        Ok(message) => message,
        Err(_) => return Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request")),
    };

    match parsed {
        JsonrpcMessage::Request(request) => {
            if let Err(error_response) = validate_request_shape(&request) {
                return Some(error_response);
            }

            let request_id = request_id_to_value(request.id);
            if request.method.trim().is_empty() {
                return Some(json_rpc_error(
                    Some(request_id),
                    INVALID_REQUEST,
                    "Invalid Request",
                ));
            }

            Some(
                handle_json_rpc_request(
                    state,
                    Some(request_id),
                    request.method,
                    request.params.map(Value::Object),
                )
                .await,
            )
        }
        JsonrpcMessage::Notification(notification) => {
            info!(method = %notification.method, "mcp notification received");
            None
        }
        JsonrpcMessage::ResultResponse(_) | JsonrpcMessage::ErrorResponse(_) => {
            Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request"))
        }
    }
}

pub fn validate_request_shape(request: &JsonrpcRequest) -> Result<(), Value> {
    let request_id = Some(request_id_to_value(request.id.clone()));
    let Ok(payload) = serde_json::to_value(request) else {
        return Err(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request"));
    };

    let valid = match request.method.as_str() {
        "tools/call" => serde_json::from_value::<CallToolRequest>(payload).is_ok(),
        "tools/list" => serde_json::from_value::<ListToolsRequest>(payload).is_ok(),
        "ping" => serde_json::from_value::<PingRequest>(payload).is_ok(),
        "initialize" => serde_json::from_value::<InitializeRequest>(payload).is_ok(),
        _ => true,
    };

    if valid {
        Ok(())
    } else {
        Err(json_rpc_error(request_id, INVALID_PARAMS, "Invalid params"))
    }
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
) -> Value {
    let audit_params = redact_audit_params(params.as_ref());

    let response = match method.as_str() {
        "initialize" => match negotiate_protocol_version(params.as_ref()) {
            Ok(version) => json_rpc_result(
                id,
                serde_json::to_value(initialize_result(version))
                    .expect("initialize result serialization"),
            ),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        "ping" => json_rpc_result(id, json!({})),
        "tools/list" => json_rpc_result(
            id,
            serde_json::to_value(ListToolsResult {
                meta: None,
                next_cursor: None,
                tools: build_tools_list(),
            })
            .expect("tools list result serialization"),
        ),
        "tools/call" => handle_tools_call(state, id, params).await,
        _ => json_rpc_error(id, METHOD_NOT_FOUND, "Method not found"),
    };

    info!(
        method = %method,
        params = %audit_params,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

fn initialize_result(protocol_version: &str) -> InitializeResult {
    InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("Notes RPC bridge".to_string()),
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            resources: None,
            prompts: None,
            ..Default::default()
        },
        protocol_version: protocol_version.to_string(),
        instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        meta: None,
    }
}

pub fn negotiate_protocol_version(params: Option<&Value>) -> Result<&'static str, AppError> {
    let offered_version = params
        .and_then(Value::as_object)
        .and_then(|object| object.get("protocolVersion"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| {
            AppError::bad_request(
                "invalid_protocol_version",
                "initialize params.protocolVersion is required",
            )
        })?;

    Ok(SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|version| *version == offered_version)
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]))
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

/// Note bodies are user data; audit lines keep their length only.
pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else if key == "content" {
                        let length = item.as_str().map(str::len).unwrap_or_default();
                        (key.clone(), Value::String(format!("[{length} bytes]")))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
