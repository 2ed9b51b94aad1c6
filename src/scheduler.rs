//! Execution phase scheduling.
//!
//! Turns a set of work items into an ordered list of phases. Dependencies are
//! the only gating rule: an item becomes ready once every dependency that is
//! part of the scheduled set has been placed in an earlier round. A dependency
//! on an id outside the set counts as already satisfied, since it was finished
//! elsewhere (for example in a previous session).
//!
//! `execution_order` is only a hint. It decides iteration order, and therefore
//! which phase comes first among items that become ready in the same round.
//!
//! If a round finds nothing ready while items remain, the graph has a cycle;
//! every stuck item is forced into that round so planning always terminates.
//!
//! Both [`schedule`] and [`schedule_phase_numbers`] drive the same readiness
//! loop and only differ in how they group a round's ready items.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{ExecutionPlan, Phase, PhaseNumbers, WorkItem};

/// The ready set produced by one pass of the readiness loop.
struct Round<'a> {
    ready: Vec<&'a WorkItem>,
    /// Nothing was ready, so all remaining items were forced in.
    forced: bool,
}

fn for_each_round<'a>(items: &'a [WorkItem], mut on_round: impl FnMut(Round<'a>)) {
    if items.is_empty() {
        return;
    }

    let known: HashSet<Uuid> = items.iter().map(|item| item.id).collect();

    // Stable sort: ties and unordered items keep their input order, nulls last.
    let mut remaining: Vec<&WorkItem> = items.iter().collect();
    remaining.sort_by_key(|item| (item.execution_order.is_none(), item.execution_order));

    let mut completed: HashSet<Uuid> = HashSet::new();

    while !remaining.is_empty() {
        let ready: Vec<&WorkItem> = remaining
            .iter()
            .copied()
            .filter(|item| {
                item.dependencies
                    .iter()
                    .all(|dep| completed.contains(dep) || !known.contains(dep))
            })
            .collect();

        let forced = ready.is_empty();
        let ready = if forced {
            std::mem::take(&mut remaining)
        } else {
            ready
        };

        completed.extend(ready.iter().map(|item| item.id));
        remaining.retain(|item| !completed.contains(&item.id));

        on_round(Round { ready, forced });
    }
}

/// Grouping key for items that became ready in the same round.
#[derive(Debug, PartialEq, Eq)]
enum GroupKey<'a> {
    /// All non-parallelizable items share one key.
    Sequential,
    /// Parallelizable items without an explicit group.
    DefaultParallel,
    Named(&'a str),
}

impl<'a> GroupKey<'a> {
    fn of(item: &'a WorkItem) -> Self {
        if !item.can_parallelize {
            return Self::Sequential;
        }
        match item.parallel_group.as_deref() {
            Some(group) => Self::Named(group),
            None => Self::DefaultParallel,
        }
    }

    fn is_parallel(&self) -> bool {
        !matches!(self, Self::Sequential)
    }
}

/// Partition a round by group key, keeping groups in first-seen order and
/// items in ready order.
fn group_round<'a>(ready: Vec<&'a WorkItem>) -> Vec<(GroupKey<'a>, Vec<&'a WorkItem>)> {
    let mut groups: Vec<(GroupKey<'a>, Vec<&'a WorkItem>)> = Vec::new();
    for item in ready {
        let key = GroupKey::of(item);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
}

/// Compute the ordered phases for `items`.
///
/// Deterministic and total: the phases partition the input exactly, and a
/// cyclic graph still yields a finite plan.
pub fn schedule(items: &[WorkItem]) -> Vec<Phase> {
    plan(items).phases
}

/// Like [`schedule`], but also reports whether a cycle had to be broken.
pub fn plan(items: &[WorkItem]) -> ExecutionPlan {
    let mut phases: Vec<Phase> = Vec::new();
    let mut had_cycle = false;

    for_each_round(items, |round| {
        had_cycle |= round.forced;

        for (key, members) in group_round(round.ready) {
            let order = phases.len() as u32 + 1;
            let can_run_in_parallel = key.is_parallel() && members.len() > 1;
            let estimated_complexity = members
                .iter()
                .filter_map(|item| item.estimated_complexity)
                .max();

            phases.push(Phase {
                order,
                items: members.into_iter().cloned().collect(),
                can_run_in_parallel,
                estimated_complexity,
            });
        }
    });

    tracing::debug!(
        items = items.len(),
        phases = phases.len(),
        had_cycle,
        "Computed execution plan"
    );

    ExecutionPlan {
        phases,
        total_items: items.len(),
        had_cycle,
    }
}

/// Lightweight plan: every round's full ready set becomes one phase.
///
/// Ignores parallelism flags and complexity. Used for the plan snapshot
/// attached to session start events.
pub fn schedule_phase_numbers(items: &[WorkItem]) -> Vec<PhaseNumbers> {
    let mut phases = Vec::new();

    for_each_round(items, |round| {
        phases.push(PhaseNumbers {
            phase: phases.len() as u32 + 1,
            item_ids: round.ready.iter().map(|item| item.id).collect(),
        });
    });

    phases
}
