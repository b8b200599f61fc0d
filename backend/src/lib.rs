//! HTTP service backing the `tasks` table used by the frontend's remote mode.

pub mod config;
pub mod error;
pub mod routes;
pub mod table;

use std::path::Path;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::table::TaskTable;

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<dyn TaskTable>,
}

impl AppState {
    pub fn new(table: impl TaskTable + 'static) -> Self {
        Self {
            table: Arc::new(table),
        }
    }
}

/// The `/api/tasks` routes on their own.
pub fn api(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", get(routes::list_tasks).post(routes::create_task))
        .route(
            "/api/tasks/:id",
            get(routes::get_task)
                .put(routes::update_task)
                .delete(routes::delete_task),
        )
        .with_state(state)
}

/// API plus the static frontend bundle.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    api(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
