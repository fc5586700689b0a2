//! Two-phase reconciliation of fleet and task-group capacity.
//!
//! Both directions respect the same dependency — the task group must stay
//! within the fleet capacity the scheduler has registered — by ordering
//! their writes and gating the second phase on observed (not intended)
//! state. A gated phase is not an error: the next scheduled pass re-reads
//! live state and finishes the job.

use serde::Serialize;
use tracing::info;

use capstan_cloud::{FleetControl, TaskGroupControl};
use capstan_core::{ObservedState, Recommendation, ScaleResult};

/// What one reconciliation pass changed.
///
/// `messages` carries human-readable before/target values for operators;
/// nothing parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub fleet_updated: bool,
    pub tasks_updated: bool,
    pub messages: Vec<String>,
}

/// Grow the fleet first, then the task group once the fleet has caught up.
///
/// Phase 1 raises the fleet's desired capacity whenever it is below target.
/// Phase 2 raises the task count only once the scheduler's registered
/// instance count equals the *target* fleet size — tasks are never
/// scheduled beyond what the fleet can currently host. Registration lags
/// phase 1, so phase 2 usually completes on a later pass.
pub async fn scale_up<F, T>(
    fleet: &F,
    tasks: &T,
    observed: &ObservedState,
    recommended: &Recommendation,
) -> ScaleResult<ReconcileReport>
where
    F: FleetControl + ?Sized,
    T: TaskGroupControl + ?Sized,
{
    let mut fleet_updated = false;
    let mut tasks_updated = false;

    if observed.fleet.desired_capacity < recommended.fleet_capacity {
        info!(
            from = observed.fleet.desired_capacity,
            to = recommended.fleet_capacity,
            "scaling up fleet"
        );
        fleet.set_desired_capacity(recommended.fleet_capacity).await?;
        fleet_updated = true;
    }

    if observed.membership.registered_instances == recommended.fleet_capacity
        && observed.tasks.desired_count < recommended.task_count
    {
        info!(
            from = observed.tasks.desired_count,
            to = recommended.task_count,
            "scaling up task group"
        );
        tasks.set_desired_count(recommended.task_count).await?;
        tasks_updated = true;
    }

    Ok(ReconcileReport {
        fleet_updated,
        tasks_updated,
        messages: summary(observed, recommended),
    })
}

/// Drain the task group first, then shrink the fleet once the drain is done.
///
/// Phase 1 lowers the desired task count whenever it is above target.
/// Phase 2 shrinks the fleet only once the *running* count equals the
/// target task count — intent to drain is not enough; shrinking earlier
/// would kill tasks that are still executing.
pub async fn scale_down<F, T>(
    fleet: &F,
    tasks: &T,
    observed: &ObservedState,
    recommended: &Recommendation,
) -> ScaleResult<ReconcileReport>
where
    F: FleetControl + ?Sized,
    T: TaskGroupControl + ?Sized,
{
    let mut fleet_updated = false;
    let mut tasks_updated = false;

    if observed.tasks.desired_count > recommended.task_count {
        info!(
            from = observed.tasks.desired_count,
            to = recommended.task_count,
            "scaling down task group"
        );
        tasks.set_desired_count(recommended.task_count).await?;
        tasks_updated = true;
    }

    if observed.tasks.running_count == recommended.task_count
        && observed.fleet.desired_capacity > recommended.fleet_capacity
    {
        info!(
            from = observed.fleet.desired_capacity,
            to = recommended.fleet_capacity,
            "scaling down fleet"
        );
        fleet.set_desired_capacity(recommended.fleet_capacity).await?;
        fleet_updated = true;
    }

    Ok(ReconcileReport {
        fleet_updated,
        tasks_updated,
        messages: summary(observed, recommended),
    })
}

fn summary(observed: &ObservedState, recommended: &Recommendation) -> Vec<String> {
    vec![
        format!(
            "fleet desired capacity: {}",
            observed.fleet.desired_capacity
        ),
        format!(
            "fleet recommended capacity: {}",
            recommended.fleet_capacity
        ),
        format!(
            "task group desired count: {}",
            observed.tasks.desired_count
        ),
        format!("task group recommended count: {}", recommended.task_count),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeFleet, FakeTasks};
    use capstan_core::{ClusterMembership, FleetState, TaskGroupState};

    fn observed(
        fleet_desired: u32,
        registered: u32,
        task_desired: u32,
        running: u32,
    ) -> ObservedState {
        ObservedState {
            fleet: FleetState {
                desired_capacity: fleet_desired,
            },
            membership: ClusterMembership {
                registered_instances: registered,
            },
            tasks: TaskGroupState {
                desired_count: task_desired,
                running_count: running,
            },
        }
    }

    fn rec(fleet: u32, tasks: u32) -> Recommendation {
        Recommendation {
            fleet_capacity: fleet,
            task_count: tasks,
        }
    }

    #[tokio::test]
    async fn scale_up_writes_fleet_and_defers_tasks() {
        let fleet = FakeFleet::new(4);
        let tasks = FakeTasks::new(4, 8, 8);

        // Registered (4) has not reached the target (6): task write gated.
        let report = scale_up(&fleet, &tasks, &observed(4, 4, 8, 8), &rec(6, 12))
            .await
            .unwrap();

        assert!(report.fleet_updated);
        assert!(!report.tasks_updated);
        assert_eq!(fleet.writes(), vec![6]);
        assert!(tasks.writes().is_empty());
    }

    #[tokio::test]
    async fn scale_up_task_gate_requires_target_registration() {
        let fleet = FakeFleet::new(5);
        let tasks = FakeTasks::new(3, 4, 4);

        // taskDesired < target, but registered (3) != target fleet (5).
        let report = scale_up(&fleet, &tasks, &observed(5, 3, 4, 4), &rec(5, 10))
            .await
            .unwrap();

        assert!(!report.fleet_updated);
        assert!(!report.tasks_updated);
        assert!(tasks.writes().is_empty());
    }

    #[tokio::test]
    async fn scale_up_completes_tasks_once_registered() {
        let fleet = FakeFleet::new(6);
        let tasks = FakeTasks::new(6, 8, 8);

        // Later pass: fleet already at 6, registration caught up.
        let report = scale_up(&fleet, &tasks, &observed(6, 6, 8, 8), &rec(6, 12))
            .await
            .unwrap();

        assert!(!report.fleet_updated);
        assert!(report.tasks_updated);
        assert!(fleet.writes().is_empty());
        assert_eq!(tasks.writes(), vec![12]);
    }

    #[tokio::test]
    async fn scale_down_drains_tasks_and_defers_fleet() {
        let fleet = FakeFleet::new(6);
        let tasks = FakeTasks::new(6, 12, 12);

        // Running (12) has not drained to the target (8): fleet write gated.
        let report = scale_down(&fleet, &tasks, &observed(6, 6, 12, 12), &rec(4, 8))
            .await
            .unwrap();

        assert!(!report.fleet_updated);
        assert!(report.tasks_updated);
        assert!(fleet.writes().is_empty());
        assert_eq!(tasks.writes(), vec![8]);
    }

    #[tokio::test]
    async fn scale_down_fleet_gate_requires_finished_drain() {
        let fleet = FakeFleet::new(6);
        let tasks = FakeTasks::new(6, 8, 10);

        // Desired already lowered to 8, but 10 tasks still running.
        let report = scale_down(&fleet, &tasks, &observed(6, 6, 8, 10), &rec(4, 8))
            .await
            .unwrap();

        assert!(!report.fleet_updated);
        assert!(!report.tasks_updated);
        assert!(fleet.writes().is_empty());
        assert!(tasks.writes().is_empty());
    }

    #[tokio::test]
    async fn scale_down_shrinks_fleet_after_drain() {
        let fleet = FakeFleet::new(6);
        let tasks = FakeTasks::new(6, 8, 8);

        // Later pass: tasks drained to 8, fleet still at 6.
        let report = scale_down(&fleet, &tasks, &observed(6, 6, 8, 8), &rec(4, 8))
            .await
            .unwrap();

        assert!(report.fleet_updated);
        assert!(!report.tasks_updated);
        assert_eq!(fleet.writes(), vec![4]);
        assert!(tasks.writes().is_empty());
    }

    #[tokio::test]
    async fn report_carries_before_and_target_values() {
        let fleet = FakeFleet::new(4);
        let tasks = FakeTasks::new(4, 8, 8);

        let report = scale_up(&fleet, &tasks, &observed(4, 4, 8, 8), &rec(6, 12))
            .await
            .unwrap();

        assert_eq!(
            report.messages,
            vec![
                "fleet desired capacity: 4",
                "fleet recommended capacity: 6",
                "task group desired count: 8",
                "task group recommended count: 12",
            ]
        );
    }
}
