//! Outer transport boundary: every handler error becomes a fixed localized
//! JSON body; stack traces and SQL text stay in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ejare_core::EjareError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Missing, invalid, or expired token.
    Unauthorized,
    /// Authenticated but wrong role (or wrong contract).
    Forbidden,
    /// Bad login credentials; deliberately indistinguishable per field.
    LoginFailed,
    NotFound(&'static str),
    BadRequest(&'static str),
    /// Notification-provider failure surfaced by the test action.
    SendFailed,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, crate::messages::UNAUTHORIZED),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, crate::messages::FORBIDDEN),
            ApiError::LoginFailed => (StatusCode::UNAUTHORIZED, crate::messages::LOGIN_FAILED),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::SendFailed => (StatusCode::BAD_GATEWAY, crate::messages::TEST_FAILED),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, crate::messages::SERVER_ERROR),
        };

        (status, Json(json!({"success": false, "message": message}))).into_response()
    }
}

impl From<EjareError> for ApiError {
    fn from(err: EjareError) -> Self {
        match err {
            EjareError::InvalidToken => ApiError::Unauthorized,
            EjareError::Forbidden(_) => ApiError::Forbidden,
            EjareError::NotFound(_) => ApiError::NotFound(crate::messages::CONTRACT_NOT_FOUND),
            EjareError::Notify(ref detail) => {
                tracing::warn!("notification send failed: {detail}");
                ApiError::SendFailed
            }
            other => {
                tracing::error!("request failed: {other}");
                ApiError::Internal
            }
        }
    }
}
