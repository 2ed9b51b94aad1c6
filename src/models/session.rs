use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::progress::EpicProgress;
use super::work_item::WorkItemKind;

/// One bounded period of agent work against an epic.
///
/// A session is created `Active`, collects work-log entries while active, and
/// reaches exactly one terminal state (`Completed` or `Abandoned`). Terminal
/// sessions are never modified again. Only one session per epic may be active.
///
/// The handoff fields (`summary`, `next_steps`, `blockers`, `decisions`,
/// `context_blob`) are only filled when a session is ended normally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub epic_id: Uuid,
    /// Caller-supplied id, e.g. the agent's own conversation id.
    pub external_id: Option<String>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub items_worked_on: Vec<WorkLogEntry>,
    pub summary: Option<String>,
    pub next_steps: Option<Vec<String>>,
    pub blockers: Option<Vec<String>>,
    pub decisions: Option<Vec<Decision>>,
    /// Free-form handoff payload for whoever picks the epic up next.
    pub context_blob: Option<String>,
}

/// The status of a session.
///
/// - `Active`: Work is in progress
/// - `Completed`: Ended normally with a handoff
/// - `Abandoned`: Ended without a handoff, either explicitly or because a new
///   session was started over it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// Append-only record of something done to a work item during a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkLogEntry {
    #[serde(rename = "type")]
    pub kind: WorkItemKind,
    pub id: Uuid,
    pub identifier: String,
    /// Free-form, e.g. `started`, `completed`, `blocked`.
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

/// A decision recorded during handoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Data for inserting a new active session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub epic_id: Uuid,
    pub external_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// Partial update of a session. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub ended_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub next_steps: Option<Vec<String>>,
    pub blockers: Option<Vec<String>>,
    pub decisions: Option<Vec<Decision>>,
    pub context_blob: Option<String>,
}

/// Handoff captured when a session ends normally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndSessionInput {
    /// What was accomplished. Required.
    pub summary: String,
    #[serde(default)]
    pub next_steps: Option<Vec<String>>,
    #[serde(default)]
    pub blockers: Option<Vec<String>>,
    #[serde(default)]
    pub decisions: Option<Vec<Decision>>,
    #[serde(default)]
    pub context_blob: Option<String>,
}

/// Input for starting a session on an epic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSessionInput {
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A work-log entry as reported by a caller. The timestamp is assigned on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWorkInput {
    #[serde(rename = "type")]
    pub kind: WorkItemKind,
    pub id: Uuid,
    pub identifier: String,
    pub action: String,
}

/// Result of starting a session.
///
/// `previous_session` is the most recently ended session for the epic, so the
/// new session can pick up its handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResult {
    pub session: Session,
    pub previous_session: Option<Session>,
    pub epic_progress: EpicProgress,
}
