//! Public API types

use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;

use crate::openai::UpstreamError;

// Errors

pub enum ApiError {
    /// The model API failed; the caller gets a 502 with the reason.
    Upstream(UpstreamError),
    /// Anything else on our side.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upstream(e) => {
                tracing::error!("Upstream error: {}", e);
                (StatusCode::BAD_GATEWAY, format!("Upstream error: {}", e)).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Something went wrong: {}", msg),
                )
                    .into_response()
            }
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err)
    }
}

impl From<handlebars::RenderError> for ApiError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Internal(err.to_string())
    }
}
