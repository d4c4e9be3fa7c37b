mod auth;
mod notes;

pub use auth::*;
pub use notes::*;

use axum::{response::IntoResponse, Json};

use crate::error::{Error, Result};

pub async fn welcome() -> &'static str {
    "Welcome to Cloud Note"
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run CPU-bound work such as password hashing on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal(anyhow::anyhow!("blocking task failed: {e}")))?
}
