use axum::{extract::State, http::StatusCode, Extension, Json};

use super::run_blocking;
use crate::api::{ApiError, ApiJson, AppState};
use crate::auth::Principal;
use crate::models::*;

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let accounts = state.accounts.clone();
    let token = run_blocking(move || accounts.register(input)).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse::new(token))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<TokenResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let token = run_blocking(move || accounts.login(input)).await?;
    Ok(Json(TokenResponse::new(token)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.profile(&principal)?))
}
