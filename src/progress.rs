//! Epic progress aggregation.

use crate::models::{EpicProgress, FeatureWithTasks, StatusCategory};

/// Count features and tasks of an epic by status category.
///
/// A feature is in progress when its status category is `Started`; anything
/// else that is not `Completed` counts only toward the totals. Single pass,
/// no I/O.
pub fn compute(features: &[FeatureWithTasks]) -> EpicProgress {
    let mut progress = EpicProgress {
        total_features: features.len(),
        ..Default::default()
    };

    for entry in features {
        match entry.feature.status.category() {
            StatusCategory::Completed => progress.completed_features += 1,
            StatusCategory::Started => progress.in_progress_features += 1,
            _ => {}
        }

        for task in &entry.tasks {
            progress.total_tasks += 1;
            if task.status.category() == StatusCategory::Completed {
                progress.completed_tasks += 1;
            }
        }
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, Task, WorkStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn feature(status: WorkStatus, task_statuses: &[WorkStatus]) -> FeatureWithTasks {
        let now = Utc::now();
        let feature = Feature {
            id: Uuid::new_v4(),
            epic_id: Uuid::nil(),
            identifier: "F-1".to_string(),
            title: "Feature".to_string(),
            description: None,
            status,
            execution_order: None,
            can_parallelize: false,
            parallel_group: None,
            dependencies: Vec::new(),
            estimated_complexity: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let tasks = task_statuses
            .iter()
            .enumerate()
            .map(|(n, status)| Task {
                id: Uuid::new_v4(),
                feature_id: feature.id,
                identifier: format!("F-1-{}", n + 1),
                title: "Task".to_string(),
                description: None,
                status: *status,
                execution_order: None,
                can_parallelize: false,
                parallel_group: None,
                dependencies: Vec::new(),
                estimated_complexity: None,
                started_at: None,
                completed_at: None,
                created_at: now,
                updated_at: now,
            })
            .collect();
        FeatureWithTasks { feature, tasks }
    }

    #[test]
    fn test_empty_epic_has_zero_progress() {
        assert_eq!(compute(&[]), EpicProgress::default());
    }

    #[test]
    fn test_counts_by_status_category() {
        let features = vec![
            feature(WorkStatus::Done, &[WorkStatus::Done, WorkStatus::Done]),
            feature(
                WorkStatus::InProgress,
                &[WorkStatus::Done, WorkStatus::InProgress, WorkStatus::Todo],
            ),
            feature(WorkStatus::Blocked, &[]),
            feature(WorkStatus::Backlog, &[WorkStatus::Canceled]),
        ];

        let progress = compute(&features);

        assert_eq!(
            progress,
            EpicProgress {
                total_features: 4,
                completed_features: 1,
                in_progress_features: 2,
                total_tasks: 6,
                completed_tasks: 3,
            }
        );
    }

    #[test]
    fn test_review_counts_as_in_progress() {
        let progress = compute(&[feature(WorkStatus::InReview, &[WorkStatus::InReview])]);

        assert_eq!(progress.in_progress_features, 1);
        assert_eq!(progress.completed_tasks, 0);
    }
}
