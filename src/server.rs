//! HTTP search server.
//!
//! Exposes the resolver as a JSON API for the chat UI.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/search` | Search an owner's conversations |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `POST /api/search` takes `{ "ownerId": "...", "query": "..." }` and
//! returns a JSON array of conversations, newest first, each optionally
//! carrying `matchType` (`title`, `message`, `both`, `document`).
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "search_failed", "message": "search failed" } }
//! ```
//!
//! Error codes: `unauthorized` (401), `bad_request` (400),
//! `search_failed` (500). Store failure details are logged, not returned.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use chat_search_core::{ConversationHit, OwnerId, SearchError};

use crate::config::Config;
use crate::search::{open_resolver, Resolver};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// One resolver over one pool for the life of the process.
    resolver: Arc<Resolver>,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

/// Build the router. Split out from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(handle_search))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the server on `[server].bind` and run until the process ends.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let resolver = open_resolver(config).await?;
    let app = router(AppState::new(resolver));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "search server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// A [`SearchError`] on its way out as an HTTP response.
struct AppError(SearchError);

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            SearchError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.0.to_string(),
            ),
            SearchError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "bad_request", self.0.to_string())
            }
            SearchError::StoreUnavailable(cause) => {
                let detail = format!("{:#}", cause);
                tracing::error!(error = %detail, "search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "search_failed",
                    "search failed".to_string(),
                )
            }
        };
        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ POST /api/search ============

/// Request body for `POST /api/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    /// Absent means the caller is unauthenticated.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub query: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Vec<ConversationHit>>, AppError> {
    let owner = OwnerId::from_caller(body.owner_id.as_deref())?;
    let hits = state.resolver.search(&owner, &body.query).await?;
    Ok(Json(hits))
}
