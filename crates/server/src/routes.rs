//! Routes served by the gateway itself: liveness, welcome and client reloading.

use std::sync::Arc;

use axum::{Json, extract::State};
use clients::ClientRegistry;
use llm::LlmError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub(crate) struct WelcomeResponse {
    message: String,
    docs_url: &'static str,
    redoc_url: &'static str,
}

pub(crate) async fn root(State(project_name): State<Arc<str>>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to the {project_name}"),
        docs_url: "/docs",
        redoc_url: "/redoc",
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct ReloadResponse {
    message: String,
    count: usize,
}

pub(crate) async fn reload_clients(
    State(registry): State<Arc<ClientRegistry>>,
) -> Result<Json<ReloadResponse>, LlmError> {
    let count = tokio::task::spawn_blocking(move || registry.reload())
        .await
        .map_err(|e| {
            log::error!("Client reload task failed: {e}");
            LlmError::Internal(None)
        })?
        .map_err(|e| {
            log::error!("Error reloading client configurations: {e}");
            LlmError::Internal(Some(format!("Error reloading client configurations: {e}")))
        })?;

    Ok(Json(ReloadResponse {
        message: format!("Successfully reloaded {count} client configurations"),
        count,
    }))
}
