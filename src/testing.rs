//! Test doubles for the RPC transport.

use std::sync::{
    atomic::{AtomicI64, AtomicU64, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    errors::RpcClientError,
    notes::{methods, CreateNoteParams, EchoParams, Note, NoteIdParams, UpdateNoteParams},
    rpc_client::RpcTransport,
};

/// Behaves like the application's RPC server, backed by a vector.
pub struct InMemoryNotesServer {
    notes: Mutex<Vec<Note>>,
    calls: Mutex<Vec<(String, Value)>>,
    next_id: AtomicU64,
    clock: AtomicI64,
}

impl Default for InMemoryNotesServer {
    fn default() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            clock: AtomicI64::new(1_772_150_400),
        }
    }
}

impl InMemoryNotesServer {
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn tick(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        let mut notes = self.notes.lock().expect("notes lock");
        match method {
            methods::SYSTEM_INFO => Ok(json!({
                "app_name": "notes-app",
                "version": "1.2.0",
                "os": "linux",
                "arch": "x86_64"
            })),
            methods::ECHO => {
                let params: EchoParams = parse_params(params)?;
                Ok(json!(params.message))
            }
            methods::NOTES_LIST => Ok(json!(*notes)),
            methods::NOTES_GET => {
                let params: NoteIdParams = parse_params(params)?;
                Ok(json!(notes.iter().find(|note| note.id == params.id)))
            }
            methods::NOTES_CREATE => {
                let params: CreateNoteParams = parse_params(params)?;
                let now = self.tick();
                let note = Note {
                    id: format!("note-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
                    title: params.title,
                    content: params.content,
                    created_at: now,
                    updated_at: now,
                };
                notes.push(note.clone());
                Ok(json!(note))
            }
            methods::NOTES_UPDATE => {
                let params: UpdateNoteParams = parse_params(params)?;
                let Some(note) = notes.iter_mut().find(|note| note.id == params.id) else {
                    return Ok(Value::Null);
                };
                if let Some(title) = params.title {
                    note.title = title;
                }
                if let Some(content) = params.content {
                    note.content = content;
                }
                note.updated_at = self.tick();
                Ok(json!(note))
            }
            methods::NOTES_DELETE => {
                let params: NoteIdParams = parse_params(params)?;
                let before = notes.len();
                notes.retain(|note| note.id != params.id);
                Ok(json!(notes.len() != before))
            }
            _ => Err(RpcClientError::Rpc {
                code: -32601,
                message: "Method not found".to_string(),
            }),
        }
    }
}

#[async_trait]
impl RpcTransport for InMemoryNotesServer {
    async fn send(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((method.to_string(), params.clone()));
        self.dispatch(method, params)
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcClientError> {
    serde_json::from_value(params).map_err(|err| RpcClientError::Rpc {
        code: -32602,
        message: format!("Invalid params: {err}"),
    })
}

/// Answers every call with the same canned outcome.
pub enum StubTransport {
    Returning(Value),
    Http(u16),
    NoResponse,
}

impl StubTransport {
    pub fn returning(value: Value) -> Self {
        Self::Returning(value)
    }

    pub fn http(status: u16) -> Self {
        Self::Http(status)
    }

    pub fn no_response() -> Self {
        Self::NoResponse
    }
}

#[async_trait]
impl RpcTransport for StubTransport {
    async fn send(&self, _method: &str, _params: Value) -> Result<Value, RpcClientError> {
        match self {
            Self::Returning(value) => Ok(value.clone()),
            Self::Http(status) => Err(RpcClientError::Http {
                status: *status,
                status_text: axum::http::StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or_default()
                    .to_string(),
            }),
            Self::NoResponse => Err(RpcClientError::NoResponse),
        }
    }
}
