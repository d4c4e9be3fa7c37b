mod error;
mod extract;
mod handlers;
mod middleware;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};
pub use middleware::{bearer_token, require_principal, AUTH_TOKEN_HEADER};

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AuthGate;
use crate::clock::Clock;
use crate::db::Database;
use crate::service::{AccountService, NoteService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    pub accounts: AccountService,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(db: Database, gate: AuthGate, clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: NoteService::new(db.clone(), clock.clone()),
            accounts: AccountService::new(db, gate.clone(), clock),
            gate,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, None)
}

/// Build the router. `cors_origins` restricts cross-origin access to the
/// listed origins; `None` allows any origin.
pub fn create_router_with_cors(state: AppState, cors_origins: Option<Vec<String>>) -> Router {
    let authenticated = from_fn_with_state(state.gate.clone(), require_principal);

    let auth = Router::new()
        .route("/createuser", post(handlers::create_user))
        .route("/login", post(handlers::login))
        .route(
            "/getuser",
            post(handlers::get_user).route_layer(authenticated.clone()),
        );

    let notes = Router::new()
        .route("/addnote", post(handlers::add_note))
        .route("/getnote", get(handlers::list_notes))
        .route("/gettrash", get(handlers::list_trash))
        .route("/updatenote/{id}", put(handlers::update_note))
        .route("/trashnote/{id}", put(handlers::trash_note))
        .route("/restorenote/{id}", put(handlers::restore_note))
        .route("/deletenote/{id}", delete(handlers::delete_note))
        .route_layer(authenticated);

    let api = Router::new()
        .route("/health", get(handlers::health))
        .nest("/auth", auth)
        .nest("/notes", notes);

    Router::new()
        .route("/", get(handlers::welcome))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
