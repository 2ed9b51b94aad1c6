use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::work_item::{Complexity, WorkItem};

/// A batch of work items that are ready to execute together.
///
/// Phases are computed fresh for every planning request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phase {
    /// 1-based position in the plan.
    pub order: u32,
    pub items: Vec<WorkItem>,
    /// True only for a parallel group with more than one item.
    pub can_run_in_parallel: bool,
    /// Highest complexity among the phase's items.
    pub estimated_complexity: Option<Complexity>,
}

/// A full phase plan plus whether the dependency graph had to be forced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub phases: Vec<Phase>,
    pub total_items: usize,
    /// Set when at least one round found no ready item and every stuck item
    /// was forced into the same round. Indicates a dependency cycle.
    pub had_cycle: bool,
}

/// Lightweight plan entry: just the phase number and the ids it contains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseNumbers {
    pub phase: u32,
    pub item_ids: Vec<Uuid>,
}
