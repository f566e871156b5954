//! HTTP front end for the comment analyzer.
//!
//! Exposes the analysis pipeline, the current-comment slot, and the history
//! over JSON:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/health` | Liveness |
//! | GET | `/comentario` | Comment currently in the slot |
//! | POST | `/comentario` | Persist an externally analysed comment |
//! | POST | `/analisis` | Analyse and persist a comment |
//! | GET | `/historial` | History (`?ultimos=N` for the newest N) |
//! | DELETE | `/historial` | Clear the history |
//! | GET | `/estadisticas` | Category counts and common tags |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, JSON shapes and status codes live here. Domain
//! rules stay in [`pipeline`]; sequencing stays in [`analyzer`].

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use analyzer::AnalysisPipeline;
use axum::routing::get;
use axum::Router;
use pipeline::{CommentSlot, HistoryStore};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, INCOHERENT_MESSAGE};

/// Shared state handed to every handler.
///
/// The slot is the single current-comment handoff owned by the serving layer.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AnalysisPipeline,
    pub store: Arc<dyn HistoryStore>,
    pub slot: Arc<Mutex<CommentSlot>>,
}

impl AppState {
    /// State with an empty slot.
    pub fn new(pipeline: AnalysisPipeline, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            pipeline,
            store,
            slot: Arc::new(Mutex::new(CommentSlot::new())),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/comentario",
            get(handlers::current_comment).post(handlers::submit_analysis),
        )
        .route("/analisis", axum::routing::post(handlers::analyze_comment))
        .route(
            "/historial",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route("/estadisticas", get(handlers::statistics))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP API listening");
    axum::serve(listener, router(state)).await
}
