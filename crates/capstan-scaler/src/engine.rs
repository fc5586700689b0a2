//! One read-decide-act pass over the fleet/task-group pair.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use capstan_cloud::{FleetControl, MetricSource, TaskGroupControl};
use capstan_core::{
    Decision, MetricSample, ObservedState, ScaleError, ScaleResult, ScalingPolicy,
};

use crate::arbiter;
use crate::classifier;
use crate::reconciler::{self, ReconcileReport};

/// Result of one scaling pass.
///
/// "Nothing to do" is an expected outcome, distinct from every error in
/// the `ScaleError` taxonomy — callers branch on it without error
/// handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A reconciliation ran; the report says which writes were issued.
    Scaled {
        decision: Decision,
        report: ReconcileReport,
    },
    /// Current capacities already match the clamped recommendation.
    NoActionNeeded,
}

/// Structured per-invocation result surfaced to the trigger.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub decision: Decision,
    pub fleet_updated: bool,
    pub tasks_updated: bool,
    pub messages: Vec<String>,
}

impl Outcome {
    pub fn report(&self) -> InvocationReport {
        match self {
            Outcome::Scaled { decision, report } => InvocationReport {
                decision: *decision,
                fleet_updated: report.fleet_updated,
                tasks_updated: report.tasks_updated,
                messages: report.messages.clone(),
            },
            Outcome::NoActionNeeded => InvocationReport {
                decision: Decision::NoChange,
                fleet_updated: false,
                tasks_updated: false,
                messages: vec!["scaling not required".to_string()],
            },
        }
    }
}

/// Drives one pass: sequential reads, arbiter, bounds, classifier,
/// permission gate, reconciler.
///
/// The engine holds no state between passes — every `run_pass` re-reads
/// live state from all three planes, which is what lets an interrupted
/// reconciliation resume on a later pass.
pub struct ScalingEngine<M, F, T> {
    metric: M,
    fleet: F,
    tasks: T,
    policy: ScalingPolicy,
    window: Duration,
}

impl<M, F, T> ScalingEngine<M, F, T>
where
    M: MetricSource,
    F: FleetControl,
    T: TaskGroupControl,
{
    /// Build an engine for one fleet/task-group pair.
    ///
    /// The policy is validated here so a misconfigured pair fails before
    /// any remote call.
    pub fn new(
        metric: M,
        fleet: F,
        tasks: T,
        policy: ScalingPolicy,
        window: Duration,
    ) -> ScaleResult<Self> {
        policy.validate()?;
        Ok(Self {
            metric,
            fleet,
            tasks,
            policy,
            window,
        })
    }

    /// Execute one scaling pass.
    pub async fn run_pass(&self) -> ScaleResult<Outcome> {
        // Reads are sequential; any failure is fatal to this pass and the
        // schedule retries by re-running it.
        let samples = self.metric.fetch_samples(self.window).await?;
        let sample = MetricSample::peak_of(&samples)?;

        let fleet_state = self.fleet.describe().await?;
        let membership = self.tasks.cluster_membership().await?;
        let task_state = self.tasks.describe().await?;
        let observed = ObservedState {
            fleet: fleet_state,
            membership,
            tasks: task_state,
        };

        let raw = arbiter::recommend(
            sample,
            self.policy.users_per_instance,
            self.policy.tasks_per_instance,
        )?;
        let recommended = raw.clamp_to(&self.policy);
        debug!(
            fleet = recommended.fleet_capacity,
            tasks = recommended.task_count,
            raw_fleet = raw.fleet_capacity,
            raw_tasks = raw.task_count,
            "clamped recommendation"
        );

        let decision = classifier::classify(
            observed.fleet.desired_capacity,
            observed.tasks.desired_count,
            &recommended,
        );
        info!(?decision, sample = sample.value(), "scaling decision");

        match decision {
            Decision::NoChange => Ok(Outcome::NoActionNeeded),
            Decision::ScaleUp => {
                if !self.policy.scale_up_allowed {
                    return Err(ScaleError::ScaleUpNotPermitted);
                }
                let report =
                    reconciler::scale_up(&self.fleet, &self.tasks, &observed, &recommended)
                        .await?;
                Ok(Outcome::Scaled { decision, report })
            }
            Decision::ScaleDown => {
                if !self.policy.scale_down_allowed {
                    return Err(ScaleError::ScaleDownNotPermitted);
                }
                let report =
                    reconciler::scale_down(&self.fleet, &self.tasks, &observed, &recommended)
                        .await?;
                Ok(Outcome::Scaled { decision, report })
            }
        }
    }
}
