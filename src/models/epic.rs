use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::work_item::{Feature, Task};

/// Top-level container of work.
///
/// Epic names are unique, so callers may refer to an epic either by its id or
/// by its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new epic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEpicInput {
    pub name: String,
    pub description: Option<String>,
}

/// A feature together with its tasks, used for planning and progress.
///
/// The `feature` fields are flattened into the JSON response, with an additional
/// `tasks` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWithTasks {
    #[serde(flatten)]
    pub feature: Feature,
    pub tasks: Vec<Task>,
}
