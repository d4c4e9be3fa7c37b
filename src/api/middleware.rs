//! Authentication gate for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use super::ApiError;
use crate::auth::AuthGate;
use crate::error::Error;

/// Header the web client sends its token in.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Pull the raw token out of the request headers.
///
/// `auth-token: <token>` wins over `Authorization: Bearer <token>`. A header
/// that is present but unreadable, or an `Authorization` header with another
/// scheme, is an invalid credential rather than a missing one.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, Error> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        return value.to_str().map(Some).map_err(|_| Error::InvalidToken);
    }

    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| Error::InvalidToken)?;
            match value.strip_prefix("Bearer ") {
                Some(token) => Ok(Some(token)),
                None => {
                    tracing::warn!("Invalid Authorization header format");
                    Err(Error::InvalidToken)
                }
            }
        }
    }
}

/// Verify the caller's token and attach the resulting [`Principal`] to the
/// request. Rejected requests never reach a handler.
///
/// [`Principal`]: crate::auth::Principal
pub async fn require_principal(
    State(gate): State<AuthGate>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let principal = gate.verify_token(token)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
