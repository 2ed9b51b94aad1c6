use serde::{Deserialize, Serialize};

/// Epic completion counts derived from current item statuses. Never persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpicProgress {
    pub total_features: usize,
    pub completed_features: usize,
    pub in_progress_features: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}
