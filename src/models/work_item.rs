use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estimated effort of a work item.
///
/// Variants are declared in ascending order so the derived `Ord` is the
/// aggregation order: `Trivial < Simple < Moderate < Complex`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Trivial,
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trivial" => Ok(Self::Trivial),
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            other => Err(format!("unknown complexity '{}'", other)),
        }
    }
}

/// Coarse bucket a [`WorkStatus`] belongs to. Progress is aggregated by category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Backlog,
    Unstarted,
    Started,
    Completed,
    Canceled,
}

/// The workflow status of a feature or task.
///
/// - `Backlog`: Captured but not planned
/// - `Todo`: Planned, not yet picked up
/// - `InProgress`: Someone is working on it
/// - `InReview`: Work done, awaiting review
/// - `Blocked`: Started but waiting on something external
/// - `Done`: Finished
/// - `Canceled`: Will not be done
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Blocked,
    Done,
    Canceled,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    pub fn category(&self) -> StatusCategory {
        match self {
            Self::Backlog => StatusCategory::Backlog,
            Self::Todo => StatusCategory::Unstarted,
            Self::InProgress | Self::InReview | Self::Blocked => StatusCategory::Started,
            Self::Done => StatusCategory::Completed,
            Self::Canceled => StatusCategory::Canceled,
        }
    }

    /// The work-log action recorded when an item moves into this status, if any.
    pub fn log_action(&self) -> Option<&'static str> {
        match self {
            Self::InProgress => Some("started"),
            Self::Blocked => Some("blocked"),
            Self::Done => Some("completed"),
            _ => None,
        }
    }
}

impl FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "in_review" => Ok(Self::InReview),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "canceled" => Ok(Self::Canceled),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Whether a work item is a feature or a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Feature,
    Task,
}

impl WorkItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Task => "task",
        }
    }
}

impl FromStr for WorkItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

/// A unit of work inside an epic. Features group tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: Uuid,
    pub epic_id: Uuid,
    /// Human-readable key, e.g. `F-3`.
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkStatus,
    /// Ordering hint among otherwise independent features. Lower runs first.
    pub execution_order: Option<i32>,
    pub can_parallelize: bool,
    pub parallel_group: Option<String>,
    /// Ids of features that must be finished first.
    pub dependencies: Vec<Uuid>,
    pub estimated_complexity: Option<Complexity>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The smallest unit of work, nested under a feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub feature_id: Uuid,
    /// Human-readable key, e.g. `F-3-2`.
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkStatus,
    pub execution_order: Option<i32>,
    pub can_parallelize: bool,
    pub parallel_group: Option<String>,
    pub dependencies: Vec<Uuid>,
    pub estimated_complexity: Option<Complexity>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a feature. Scheduling fields default to "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    /// Explicit identifier. Generated as `F-<n>` when omitted.
    #[serde(default)]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status. Defaults to `Backlog`.
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default)]
    pub execution_order: Option<i32>,
    #[serde(default)]
    pub can_parallelize: bool,
    #[serde(default)]
    pub parallel_group: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub estimated_complexity: Option<Complexity>,
}

/// Input for creating a task under a feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskInput {
    /// Explicit identifier. Generated as `<feature identifier>-<n>` when omitted.
    #[serde(default)]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default)]
    pub execution_order: Option<i32>,
    #[serde(default)]
    pub can_parallelize: bool,
    #[serde(default)]
    pub parallel_group: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub estimated_complexity: Option<Complexity>,
}

/// Input for moving a feature or task to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusInput {
    pub status: WorkStatus,
}

/// The scheduling view of a feature or task.
///
/// This is all the phase scheduler looks at. Dependencies may point at ids
/// outside the set being scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    pub id: Uuid,
    pub identifier: String,
    pub title: String,
    pub execution_order: Option<i32>,
    pub can_parallelize: bool,
    pub parallel_group: Option<String>,
    pub dependencies: Vec<Uuid>,
    pub estimated_complexity: Option<Complexity>,
}

impl From<&Feature> for WorkItem {
    fn from(f: &Feature) -> Self {
        Self {
            id: f.id,
            identifier: f.identifier.clone(),
            title: f.title.clone(),
            execution_order: f.execution_order,
            can_parallelize: f.can_parallelize,
            parallel_group: f.parallel_group.clone(),
            dependencies: f.dependencies.clone(),
            estimated_complexity: f.estimated_complexity,
        }
    }
}

impl From<&Task> for WorkItem {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            identifier: t.identifier.clone(),
            title: t.title.clone(),
            execution_order: t.execution_order,
            can_parallelize: t.can_parallelize,
            parallel_group: t.parallel_group.clone(),
            dependencies: t.dependencies.clone(),
            estimated_complexity: t.estimated_complexity,
        }
    }
}

/// Denormalized details of a finished item, attached to completion events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetails {
    pub title: String,
    pub identifier: String,
    /// Feature identifier for tasks, epic name for features.
    pub parent_identifier: Option<String>,
    pub status_name: String,
    /// Minutes between `started_at` and `completed_at`, when both are recorded.
    pub duration_minutes: Option<i64>,
}

/// Whole minutes between two optional timestamps.
pub fn duration_minutes(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (started_at, completed_at) {
        (Some(start), Some(end)) if end >= start => Some((end - start).num_minutes()),
        _ => None,
    }
}
