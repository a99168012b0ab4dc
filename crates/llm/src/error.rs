use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clients::Endpoint;
use config::ProviderId;
use serde::Serialize;
use thiserror::Error;

pub type LlmResult<T> = std::result::Result<T, LlmError>;

pub(crate) const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Errors surfaced to API clients, each with its HTTP status code.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or wrong client credentials.
    #[error("Invalid client credentials")]
    Unauthorized,

    /// The client is authenticated but the endpoint is not in its allow-list.
    #[error("Client does not have permission to access endpoint: {0}")]
    EndpointForbidden(Endpoint),

    /// The client is authenticated but the provider is not in its allow-list.
    #[error("Client does not have permission to use provider: {0}")]
    ProviderForbidden(ProviderId),

    /// The requested token count is above the client's ceiling.
    #[error("Max tokens limit exceeded. Maximum allowed: {limit}")]
    LimitExceeded { limit: u64 },

    /// The request body is malformed or fails validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider is allowed for the client but not enabled on this gateway.
    #[error("Invalid provider: {0}")]
    InvalidProvider(ProviderId),

    /// The upstream provider call failed.
    #[error("Error generating text: {0}")]
    Upstream(String),

    /// Internal server error.
    /// If Some(message), the message is safe to show.
    /// If None, the details stay in the logs.
    #[error("Internal server error")]
    Internal(Option<String>),
}

impl LlmError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EndpointForbidden(_) | Self::ProviderForbidden(_) => StatusCode::FORBIDDEN,
            Self::LimitExceeded { .. } | Self::InvalidProvider(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response.
    pub fn error_type(&self) -> &str {
        match self {
            Self::Unauthorized => "authentication_error",
            Self::EndpointForbidden(_) | Self::ProviderForbidden(_) => "permission_error",
            Self::LimitExceeded { .. } | Self::InvalidRequest(_) | Self::InvalidProvider(_) => "invalid_request_error",
            Self::Upstream(_) => "api_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(Some(message)) => message.clone(),
            Self::Internal(None) => UNEXPECTED_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for LlmError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
