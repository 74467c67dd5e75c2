use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod notes;
pub mod rpc_client;

#[cfg(test)]
pub(crate) mod testing;

use notes::NotesApi;

#[derive(Clone)]
pub struct AppState {
    pub api_token: Option<Arc<str>>,
    pub notes: NotesApi,
}

impl AppState {
    pub fn new(api_token: Option<String>, notes: NotesApi) -> Self {
        Self {
            api_token: api_token.map(Arc::<str>::from),
            notes,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/mcp", post(http::handlers::mcp_endpoint))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .merge(protected)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
