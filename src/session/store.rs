use anyhow::Result;
use uuid::Uuid;

use crate::models::*;

/// Which session to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionQuery {
    ById(Uuid),
    /// The epic's active session, if any.
    ActiveForEpic(Uuid),
    /// The epic's most recently ended session (completed or abandoned),
    /// ordered by `ended_at`.
    LastEndedForEpic(Uuid),
}

/// Result of inserting a new active session.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session: Session,
    /// Sessions that were still active for the epic and got abandoned.
    pub abandoned: Vec<Session>,
}

/// Persistence used by the session coordinator.
///
/// Session list fields are typed here; implementations own their encoding.
pub trait EntityStore: Send + Sync {
    /// Resolve an epic by id or by its unique name.
    fn find_epic(&self, id_or_name: &str) -> Result<Option<Epic>>;

    fn list_features_with_tasks(&self, epic_id: Uuid) -> Result<Vec<FeatureWithTasks>>;

    fn find_feature(&self, id: Uuid) -> Result<Option<Feature>>;

    fn list_tasks(&self, feature_id: Uuid) -> Result<Vec<Task>>;

    /// Insert a new active session for `new.epic_id`.
    ///
    /// Any session still active for the epic must be moved to `Abandoned`
    /// (with `ended_at = new.started_at`) in the same atomic step as the
    /// insert, so the epic never has two active sessions.
    fn create_session(&self, new: NewSession) -> Result<CreatedSession>;

    /// Apply `patch` to an active session.
    ///
    /// Returns `None` when the session does not exist or is already terminal.
    fn update_session(&self, id: Uuid, patch: SessionPatch) -> Result<Option<Session>>;

    /// Append `entry` to an active session's work log in one atomic step.
    ///
    /// Concurrent appends must all be kept. Returns `None` when the session
    /// does not exist or is already terminal.
    fn append_work_log(&self, id: Uuid, entry: WorkLogEntry) -> Result<Option<Session>>;

    fn find_session(&self, query: SessionQuery) -> Result<Option<Session>>;

    /// Sessions for an epic, newest first.
    fn list_sessions(&self, epic_id: Uuid, limit: usize) -> Result<Vec<Session>>;

    /// Denormalized details of a feature or task, for completion events.
    fn find_item_details(&self, kind: WorkItemKind, id: Uuid) -> Result<Option<ItemDetails>>;
}
