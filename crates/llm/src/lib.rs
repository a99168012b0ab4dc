use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Json, State, rejection::JsonRejection},
    routing::post,
};
use clients::ClientRecord;

mod dispatcher;
mod error;
mod messages;
pub mod provider;

pub use dispatcher::Dispatcher;
pub use error::{LlmError, LlmResult as Result};
pub use messages::{GenerateRequest, GenerateResponse, Usage};

/// Creates the router for the generation endpoint.
///
/// The authenticated client record must already be in the request extensions.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .with_state(dispatcher)
}

async fn generate(
    State(dispatcher): State<Arc<Dispatcher>>,
    Extension(client): Extension<Arc<ClientRecord>>,
    body: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = body.map_err(|rejection| LlmError::InvalidRequest(rejection.body_text()))?;

    request.validate()?;

    log::debug!(
        "Generate request from {} (provider: {:?}, model: {:?}, max_tokens: {})",
        client.client_id,
        request.provider,
        request.model,
        request.max_tokens
    );

    let response = dispatcher.generate(&client, request).await?;

    Ok(Json(response))
}
