use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::Error;

/// Boundary wrapper that turns a core [`Error`] into an HTTP response.
///
/// Store and internal failures are logged in full and reported to the client
/// as a generic message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::InvalidCredentials => StatusCode::BAD_REQUEST,
            Error::Unauthenticated | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::EmailTaken => StatusCode::CONFLICT,
            Error::Store(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            Error::Store(_) | Error::Internal(_) => {
                tracing::error!("Internal error: {}", self.0);
                "Internal server error occurred".to_string()
            }
            Error::Unauthenticated | Error::InvalidToken => {
                tracing::warn!("Rejected request: {}", self.0);
                self.0.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "success": false, "error": message }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
