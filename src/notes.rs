//! Typed operations over the application's notes and system RPC methods
//!
//! Each operation fixes an RPC method name and its parameter and result
//! shapes. Errors from the transport propagate unchanged.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{errors::RpcClientError, rpc_client::RpcTransport};

pub mod methods {
    pub const SYSTEM_INFO: &str = "system_info";
    pub const ECHO: &str = "echo";
    pub const NOTES_LIST: &str = "notes_list";
    pub const NOTES_GET: &str = "notes_get";
    pub const NOTES_CREATE: &str = "notes_create";
    pub const NOTES_UPDATE: &str = "notes_update";
    pub const NOTES_DELETE: &str = "notes_delete";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub app_name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoParams {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteIdParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteParams {
    pub title: String,
    pub content: String,
}

/// Only fields set to `Some` are sent, so the server keeps the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteParams {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct NotesApi {
    transport: Arc<dyn RpcTransport>,
}

impl NotesApi {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub async fn system_info(&self) -> Result<SystemInfo, RpcClientError> {
        self.call(methods::SYSTEM_INFO, &NoParams {}).await
    }

    pub async fn echo(&self, message: impl Into<String>) -> Result<String, RpcClientError> {
        self.call(
            methods::ECHO,
            &EchoParams {
                message: message.into(),
            },
        )
        .await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>, RpcClientError> {
        let notes: Option<Vec<Note>> = self.call(methods::NOTES_LIST, &NoParams {}).await?;
        Ok(notes.unwrap_or_default())
    }

    pub async fn get_note(&self, id: impl Into<String>) -> Result<Option<Note>, RpcClientError> {
        self.call(methods::NOTES_GET, &NoteIdParams { id: id.into() })
            .await
    }

    pub async fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note, RpcClientError> {
        self.call(
            methods::NOTES_CREATE,
            &CreateNoteParams {
                title: title.into(),
                content: content.into(),
            },
        )
        .await
    }

    pub async fn update_note(
        &self,
        params: UpdateNoteParams,
    ) -> Result<Option<Note>, RpcClientError> {
        self.call(methods::NOTES_UPDATE, &params).await
    }

    pub async fn delete_note(&self, id: impl Into<String>) -> Result<bool, RpcClientError> {
        let deleted: Option<bool> = self
            .call(methods::NOTES_DELETE, &NoteIdParams { id: id.into() })
            .await?;
        Ok(deleted.unwrap_or(false))
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, RpcClientError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(|err| {
            RpcClientError::request_setup(format!("failed to encode params for {method}: {err}"))
        })?;
        let result = self.transport.send(method, params).await?;
        serde_json::from_value(result)
            .map_err(|err| RpcClientError::unexpected_result(method, err.to_string()))
    }
}
