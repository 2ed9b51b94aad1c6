//! Session lifecycle coordination.
//!
//! Sessions move through `Active → Completed | Abandoned`, evaluated per
//! epic. Starting a session never fails because another one is active: the
//! old session is abandoned and the new one takes over. Work logging is
//! fail-open, since it runs as a side effect of other operations.

mod store;

pub use store::*;

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::events::{EventSink, SessionEvent, SessionEventType};
use crate::models::*;
use crate::{progress, scheduler};

/// Action that marks a work-log entry as a completion.
pub const COMPLETED_ACTION: &str = "completed";

pub struct SessionCoordinator<S> {
    store: S,
    events: Arc<dyn EventSink>,
}

impl<S: Clone> Clone for SessionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: EntityStore> SessionCoordinator<S> {
    pub fn new(store: S, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolve_epic(&self, epic: &str) -> Result<Epic> {
        self.store
            .find_epic(epic)?
            .ok_or_else(|| SessionError::NotFound(format!("Epic '{}' not found", epic)))
    }

    fn emit(&self, event_type: SessionEventType, session: &Session, payload: serde_json::Value) {
        self.events.emit(SessionEvent {
            event_type,
            session_id: session.id,
            epic_id: session.epic_id,
            timestamp: Utc::now(),
            payload,
        });
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Open a new session on an epic, abandoning any session still active.
    pub fn start_session(&self, epic: &str, input: StartSessionInput) -> Result<StartSessionResult> {
        let epic = self.resolve_epic(epic)?;
        let features = self.store.list_features_with_tasks(epic.id)?;

        let created = self.store.create_session(NewSession {
            epic_id: epic.id,
            external_id: input.external_id,
            started_at: Utc::now(),
        })?;

        for stale in &created.abandoned {
            tracing::info!(
                session_id = %stale.id,
                epic_id = %epic.id,
                "Abandoned active session on new session start"
            );
        }

        let previous_session = self
            .store
            .find_session(SessionQuery::LastEndedForEpic(epic.id))?;

        let items: Vec<WorkItem> = features.iter().map(|f| WorkItem::from(&f.feature)).collect();
        let execution_plan = scheduler::schedule_phase_numbers(&items);
        let epic_progress = progress::compute(&features);

        let session = created.session;
        tracing::info!(
            session_id = %session.id,
            epic = %epic.name,
            phases = execution_plan.len(),
            "Session started"
        );

        self.emit(
            SessionEventType::SessionStarted,
            &session,
            json!({
                "external_id": session.external_id,
                "total_features": epic_progress.total_features,
                "total_tasks": epic_progress.total_tasks,
                "epic_progress": epic_progress,
                "execution_plan": execution_plan,
            }),
        );

        Ok(StartSessionResult {
            session,
            previous_session,
            epic_progress,
        })
    }

    /// Complete the epic's active session and record the handoff.
    pub fn end_session(&self, epic: &str, input: EndSessionInput) -> Result<Session> {
        let epic = self.resolve_epic(epic)?;
        if input.summary.trim().is_empty() {
            return Err(SessionError::Validation("summary is required".to_string()));
        }

        let active = self
            .store
            .find_session(SessionQuery::ActiveForEpic(epic.id))?
            .ok_or_else(|| {
                SessionError::Validation(format!("no active session for epic '{}'", epic.name))
            })?;

        let mut payload = json!({
            "status": SessionStatus::Completed.as_str(),
            "summary": input.summary,
        });
        if let Some(next_steps) = &input.next_steps {
            payload["next_steps"] = json!(next_steps);
        }
        if let Some(blockers) = &input.blockers {
            payload["blockers"] = json!(blockers);
        }
        if let Some(decisions) = &input.decisions {
            payload["decisions"] = json!(decisions);
        }
        if let Some(context_blob) = &input.context_blob {
            payload["context_blob"] = json!(context_blob);
        }

        let session = self
            .store
            .update_session(
                active.id,
                SessionPatch {
                    status: Some(SessionStatus::Completed),
                    ended_at: Some(Utc::now()),
                    summary: Some(input.summary),
                    next_steps: input.next_steps,
                    blockers: input.blockers,
                    decisions: input.decisions,
                    context_blob: input.context_blob,
                    ..Default::default()
                },
            )?
            .ok_or_else(|| {
                SessionError::Validation(format!("session {} is no longer active", active.id))
            })?;

        tracing::info!(session_id = %session.id, epic = %epic.name, "Session ended");
        self.emit(SessionEventType::SessionEnded, &session, payload);

        Ok(session)
    }

    /// Abandon an active session without a handoff.
    pub fn abandon_session(&self, session_id: Uuid) -> Result<Session> {
        let session = self
            .store
            .find_session(SessionQuery::ById(session_id))?
            .ok_or_else(|| SessionError::NotFound(format!("Session {} not found", session_id)))?;

        if session.status.is_terminal() {
            return Err(SessionError::Validation(format!(
                "session {} is {}, only active sessions can be abandoned",
                session_id,
                session.status.as_str()
            )));
        }

        let session = self
            .store
            .update_session(
                session_id,
                SessionPatch {
                    status: Some(SessionStatus::Abandoned),
                    ended_at: Some(Utc::now()),
                    ..Default::default()
                },
            )?
            .ok_or_else(|| {
                SessionError::Validation(format!("session {} is no longer active", session_id))
            })?;

        tracing::info!(session_id = %session.id, "Session abandoned");
        self.emit(
            SessionEventType::SessionEnded,
            &session,
            json!({ "status": SessionStatus::Abandoned.as_str() }),
        );

        Ok(session)
    }

    // ============================================================
    // Work logging
    // ============================================================

    /// Append a work-log entry to the epic's active session.
    ///
    /// Never fails: a missing epic, no active session, or a storage error all
    /// yield `None`.
    pub fn log_work(&self, epic: &str, input: LogWorkInput) -> Option<Session> {
        match self.try_log_work(epic, input) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(epic, error = %e, "Failed to log session work");
                None
            }
        }
    }

    fn try_log_work(&self, epic: &str, input: LogWorkInput) -> Result<Option<Session>> {
        let Some(epic) = self.store.find_epic(epic)? else {
            return Ok(None);
        };
        let Some(active) = self
            .store
            .find_session(SessionQuery::ActiveForEpic(epic.id))?
        else {
            return Ok(None);
        };

        let entry = WorkLogEntry {
            kind: input.kind,
            id: input.id,
            identifier: input.identifier,
            action: input.action,
            timestamp: Utc::now(),
        };

        let Some(session) = self.store.append_work_log(active.id, entry.clone())? else {
            return Ok(None);
        };

        if entry.action == COMPLETED_ACTION {
            self.emit_completion(&session, &entry);
        }

        Ok(Some(session))
    }

    /// Emit the enriched completion event, skipping it when details are unavailable.
    fn emit_completion(&self, session: &Session, entry: &WorkLogEntry) {
        let details = match self.store.find_item_details(entry.kind, entry.id) {
            Ok(Some(details)) => details,
            Ok(None) => {
                tracing::debug!(item_id = %entry.id, "Completed item not found, skipping event");
                return;
            }
            Err(e) => {
                tracing::warn!(item_id = %entry.id, error = %e, "Failed to load completed item");
                return;
            }
        };

        let event_type = match entry.kind {
            WorkItemKind::Feature => SessionEventType::SessionFeatureCompleted,
            WorkItemKind::Task => SessionEventType::SessionTaskCompleted,
        };

        self.emit(
            event_type,
            session,
            json!({
                "item_id": entry.id,
                "identifier": details.identifier,
                "title": details.title,
                "parent_identifier": details.parent_identifier,
                "status_name": details.status_name,
                "duration_minutes": details.duration_minutes,
            }),
        );
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn get_active_session(&self, epic: &str) -> Result<Option<Session>> {
        let epic = self.resolve_epic(epic)?;
        Ok(self
            .store
            .find_session(SessionQuery::ActiveForEpic(epic.id))?)
    }

    pub fn get_last_session(&self, epic: &str) -> Result<Option<Session>> {
        let epic = self.resolve_epic(epic)?;
        Ok(self
            .store
            .find_session(SessionQuery::LastEndedForEpic(epic.id))?)
    }

    pub fn get_session_history(&self, epic: &str, limit: usize) -> Result<Vec<Session>> {
        let epic = self.resolve_epic(epic)?;
        Ok(self.store.list_sessions(epic.id, limit)?)
    }

    pub fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.store.find_session(SessionQuery::ById(id))?)
    }

    /// Full phase plan over the epic's features.
    pub fn execution_plan(&self, epic: &str) -> Result<ExecutionPlan> {
        let epic = self.resolve_epic(epic)?;
        let features = self.store.list_features_with_tasks(epic.id)?;
        let items: Vec<WorkItem> = features.iter().map(|f| WorkItem::from(&f.feature)).collect();
        Ok(scheduler::plan(&items))
    }

    /// Phase plan over one feature's tasks.
    pub fn task_plan(&self, feature_id: Uuid) -> Result<ExecutionPlan> {
        if self.store.find_feature(feature_id)?.is_none() {
            return Err(SessionError::NotFound(format!(
                "Feature {} not found",
                feature_id
            )));
        }
        let tasks = self.store.list_tasks(feature_id)?;
        let items: Vec<WorkItem> = tasks.iter().map(WorkItem::from).collect();
        Ok(scheduler::plan(&items))
    }

    pub fn progress(&self, epic: &str) -> Result<EpicProgress> {
        let epic = self.resolve_epic(epic)?;
        let features = self.store.list_features_with_tasks(epic.id)?;
        Ok(progress::compute(&features))
    }
}
