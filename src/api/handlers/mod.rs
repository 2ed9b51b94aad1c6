use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::SessionError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// A few storage errors are really input problems (e.g. a duplicate epic
/// name). Those are returned as-is with a BAD_REQUEST status.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    if msg.contains("already exists") || msg.contains("not found") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn session_error(e: SessionError) -> (StatusCode, String) {
    match e {
        SessionError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        SessionError::Validation(msg) => {
            tracing::warn!("Validation error: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        SessionError::Storage(e) => internal_error(e),
    }
}

fn resolve_epic(state: &AppState, epic: &str) -> Result<Epic, (StatusCode, String)> {
    state
        .db
        .find_epic(epic)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("Epic '{}' not found", epic)))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Epics
// ============================================================

pub async fn list_epics(
    State(state): State<AppState>,
) -> Result<Json<Vec<Epic>>, (StatusCode, String)> {
    state.db.get_all_epics().map(Json).map_err(internal_error)
}

pub async fn create_epic(
    State(state): State<AppState>,
    Json(input): Json<CreateEpicInput>,
) -> Result<(StatusCode, Json<Epic>), (StatusCode, String)> {
    state
        .db
        .create_epic(input)
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(internal_error)
}

pub async fn get_epic(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<Epic>, (StatusCode, String)> {
    resolve_epic(&state, &epic).map(Json)
}

pub async fn get_execution_plan(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<ExecutionPlan>, (StatusCode, String)> {
    state
        .sessions
        .execution_plan(&epic)
        .map(Json)
        .map_err(session_error)
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<EpicProgress>, (StatusCode, String)> {
    state
        .sessions
        .progress(&epic)
        .map(Json)
        .map_err(session_error)
}

// ============================================================
// Features & Tasks
// ============================================================

pub async fn list_features(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<Vec<FeatureWithTasks>>, (StatusCode, String)> {
    let epic = resolve_epic(&state, &epic)?;
    state
        .db
        .get_features_with_tasks(epic.id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_feature(
    State(state): State<AppState>,
    Path(epic): Path<String>,
    Json(input): Json<CreateFeatureInput>,
) -> Result<(StatusCode, Json<Feature>), (StatusCode, String)> {
    let epic = resolve_epic(&state, &epic)?;
    state
        .db
        .create_feature(epic.id, input)
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(internal_error)
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(feature_id): Path<Uuid>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    state
        .db
        .get_feature(feature_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Feature not found".to_string()))?;

    state
        .db
        .create_task(feature_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

/// Phase plan over one feature's tasks.
pub async fn get_task_plan(
    State(state): State<AppState>,
    Path(feature_id): Path<Uuid>,
) -> Result<Json<ExecutionPlan>, (StatusCode, String)> {
    state
        .sessions
        .task_plan(feature_id)
        .map(Json)
        .map_err(session_error)
}

/// Record a status change in the epic's active session, if there is one.
fn log_status_change(state: &AppState, epic_id: Uuid, entry: LogWorkInput) {
    if state.sessions.log_work(&epic_id.to_string(), entry).is_some() {
        tracing::debug!(epic_id = %epic_id, "Logged status change to active session");
    }
}

pub async fn update_feature_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<Feature>, (StatusCode, String)> {
    let feature = state
        .db
        .update_feature_status(id, input.status)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Feature not found".to_string()))?;

    if let Some(action) = input.status.log_action() {
        log_status_change(
            &state,
            feature.epic_id,
            LogWorkInput {
                kind: WorkItemKind::Feature,
                id: feature.id,
                identifier: feature.identifier.clone(),
                action: action.to_string(),
            },
        );
    }

    Ok(Json(feature))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .db
        .update_task_status(id, input.status)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))?;

    if let Some(action) = input.status.log_action() {
        // Logging is best-effort; a failed lookup must not fail the update.
        if let Ok(Some(feature)) = state.db.get_feature(task.feature_id) {
            log_status_change(
                &state,
                feature.epic_id,
                LogWorkInput {
                    kind: WorkItemKind::Task,
                    id: task.id,
                    identifier: task.identifier.clone(),
                    action: action.to_string(),
                },
            );
        }
    }

    Ok(Json(task))
}

// ============================================================
// Sessions
// ============================================================

pub async fn start_session(
    State(state): State<AppState>,
    Path(epic): Path<String>,
    input: Option<Json<StartSessionInput>>,
) -> Result<(StatusCode, Json<StartSessionResult>), (StatusCode, String)> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    state
        .sessions
        .start_session(&epic, input)
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(session_error)
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(epic): Path<String>,
    Json(input): Json<EndSessionInput>,
) -> Result<Json<Session>, (StatusCode, String)> {
    state
        .sessions
        .end_session(&epic, input)
        .map(Json)
        .map_err(session_error)
}

pub async fn abandon_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, (StatusCode, String)> {
    state
        .sessions
        .abandon_session(id)
        .map(Json)
        .map_err(session_error)
}

/// Always succeeds; `null` means nothing was logged.
pub async fn log_work(
    State(state): State<AppState>,
    Path(epic): Path<String>,
    Json(input): Json<LogWorkInput>,
) -> Json<Option<Session>> {
    Json(state.sessions.log_work(&epic, input))
}

pub async fn get_active_session(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<Option<Session>>, (StatusCode, String)> {
    state
        .sessions
        .get_active_session(&epic)
        .map(Json)
        .map_err(session_error)
}

pub async fn get_last_session(
    State(state): State<AppState>,
    Path(epic): Path<String>,
) -> Result<Json<Option<Session>>, (StatusCode, String)> {
    state
        .sessions
        .get_last_session(&epic)
        .map(Json)
        .map_err(session_error)
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn get_session_history(
    State(state): State<AppState>,
    Path(epic): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Session>>, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(state.history_limit);
    state
        .sessions
        .get_session_history(&epic, limit)
        .map(Json)
        .map_err(session_error)
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, (StatusCode, String)> {
    state
        .sessions
        .get_session(id)
        .map_err(session_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Session not found".to_string()))
}
