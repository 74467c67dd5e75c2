use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

pub const NO_RESPONSE_MESSAGE: &str =
    "no response received from the RPC server; verify that the application is running";

/// Failures of a single RPC round trip, classified by where they happened.
#[derive(Debug, Error)]
pub enum RpcClientError {
    /// The remote application answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("http error {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("no response received from the RPC server; verify that the application is running")]
    NoResponse,
    #[error("failed to set up rpc request: {message}")]
    RequestSetup { message: String },
    #[error("unexpected result for {method}: {message}")]
    UnexpectedResult { method: String, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl RpcClientError {
    pub fn request_setup(message: impl Into<String>) -> Self {
        Self::RequestSetup {
            message: message.into(),
        }
    }

    pub fn unexpected_result(method: &str, message: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            method: method.to_string(),
            message: message.into(),
        }
    }
}

/// Startup and serving failures that end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("mcp server i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("unauthorized: {message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self::Unauthorized { code, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, code, message.to_string())
            }
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, code, message.to_string())
            }
            Self::Internal { code, message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}
