use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiError, ApiJson, ApiPath, AppState};
use crate::auth::Principal;
use crate::models::*;

pub async fn add_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<CreateNoteInput>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.notes.add_note(&principal, input)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.notes.list_notes(&principal)?))
}

pub async fn list_trash(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.notes.list_trash(&principal)?))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<NotePatch>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.update_note(&principal, id, patch)?))
}

pub async fn trash_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.trash_note(&principal, id)?))
}

pub async fn restore_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.restore_note(&principal, id)?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.notes.delete_note(&principal, id)?;
    Ok(Json(json!({
        "success": true,
        "msg": "Your note has been deleted successfully",
    })))
}
