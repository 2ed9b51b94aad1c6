mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::db::Database;
use crate::events::{EventSink, TracingEventSink};
use crate::session::SessionCoordinator;

/// Session coordinator backed by the SQLite store.
pub type Coordinator = SessionCoordinator<Database>;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Coordinator,
    /// Page size for session history when the request gives none.
    pub history_limit: usize,
}

impl AppState {
    pub fn new(db: Database, events: Arc<dyn EventSink>, history_limit: usize) -> Self {
        Self {
            sessions: SessionCoordinator::new(db.clone(), events),
            db,
            history_limit,
        }
    }
}

impl From<Database> for AppState {
    fn from(db: Database) -> Self {
        Self::new(db, Arc::new(TracingEventSink), DEFAULT_HISTORY_LIMIT)
    }
}

pub fn create_router(state: impl Into<AppState>) -> Router {
    let api = Router::new()
        // Epics
        .route("/epics", get(handlers::list_epics))
        .route("/epics", post(handlers::create_epic))
        .route("/epics/{epic}", get(handlers::get_epic))
        .route("/epics/{epic}/features", get(handlers::list_features))
        .route("/epics/{epic}/features", post(handlers::create_feature))
        .route("/epics/{epic}/execution-plan", get(handlers::get_execution_plan))
        .route("/epics/{epic}/progress", get(handlers::get_progress))
        // Sessions (by epic)
        .route("/epics/{epic}/sessions", get(handlers::get_session_history))
        .route("/epics/{epic}/sessions", post(handlers::start_session))
        .route("/epics/{epic}/sessions/active", get(handlers::get_active_session))
        .route("/epics/{epic}/sessions/last", get(handlers::get_last_session))
        .route("/epics/{epic}/sessions/end", post(handlers::end_session))
        .route("/epics/{epic}/sessions/log", post(handlers::log_work))
        // Sessions (by session id)
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}/abandon", post(handlers::abandon_session))
        // Work items
        .route("/features/{id}/tasks", post(handlers::create_task))
        .route("/features/{id}/execution-plan", get(handlers::get_task_plan))
        .route("/features/{id}/status", put(handlers::update_feature_status))
        .route("/tasks/{id}/status", put(handlers::update_task_status))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.into())
}
