//! Scaling classifier — current vs. recommended capacity, as a direction.

use capstan_core::{Decision, Recommendation};

/// Classify the required change for the fleet/task-group pair.
///
/// Rules are evaluated in fixed order: any resource above its current
/// value classifies the pass as `ScaleUp` before the down rule is
/// considered, so a fleet-up/tasks-down conflict resolves to `ScaleUp`.
pub fn classify(current_fleet: u32, current_tasks: u32, recommended: &Recommendation) -> Decision {
    if recommended.fleet_capacity > current_fleet || recommended.task_count > current_tasks {
        Decision::ScaleUp
    } else if recommended.fleet_capacity < current_fleet || recommended.task_count < current_tasks
    {
        Decision::ScaleDown
    } else {
        Decision::NoChange
    }
}
