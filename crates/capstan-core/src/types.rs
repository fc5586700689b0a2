//! Domain types for the capstan scaling loop.
//!
//! All of these are transient — read or derived fresh on every invocation,
//! never cached between passes. The fleet and task-group states are owned by
//! their control planes; capstan only reads them and issues desired-value
//! writes.

use serde::{Deserialize, Serialize};

use crate::error::{ScaleError, ScaleResult};

// ── Metric ─────────────────────────────────────────────────────────

/// Peak observed load over the trailing metric window.
///
/// Always strictly positive: an empty window or an all-zero window is a
/// fetch failure (`MetricUnavailable`), never a valid zero-load reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample(f64);

impl MetricSample {
    /// Aggregate a raw sample series into the peak sample.
    ///
    /// Takes the maximum of the window; errors if the series is empty or
    /// the maximum is not strictly positive.
    pub fn peak_of(samples: &[f64]) -> ScaleResult<Self> {
        let peak = samples.iter().copied().fold(f64::MIN, f64::max);
        if samples.is_empty() || peak <= 0.0 {
            return Err(ScaleError::MetricUnavailable);
        }
        Ok(Self(peak))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// ── Observed resource state ────────────────────────────────────────

/// Desired capacity of the VM fleet, as reported by the fleet plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetState {
    pub desired_capacity: u32,
}

/// How many fleet instances the task scheduler currently knows about.
///
/// Lags `FleetState.desired_capacity` after a scale-up until freshly
/// launched instances finish joining the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMembership {
    pub registered_instances: u32,
}

/// Desired and running task counts for the task group.
///
/// `running_count` lags `desired_count` after a scale-down until tasks
/// finish draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroupState {
    pub desired_count: u32,
    pub running_count: u32,
}

/// Everything one invocation observed before deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedState {
    pub fleet: FleetState,
    pub membership: ClusterMembership,
    pub tasks: TaskGroupState,
}

// ── Policy ─────────────────────────────────────────────────────────

/// Inclusive `[min, max]` window for one resource's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityBounds {
    pub min: u32,
    pub max: u32,
}

impl CapacityBounds {
    /// Clamp a recommended value into this window. Idempotent.
    pub fn clamp(&self, value: u32) -> u32 {
        value.max(self.min).min(self.max)
    }

    fn validate(&self, resource: &str) -> ScaleResult<()> {
        if self.min > self.max {
            return Err(ScaleError::InvalidPolicy(format!(
                "{resource} bounds are inverted: min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Scaling policy for one fleet/task-group pair. Immutable per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub fleet: CapacityBounds,
    pub tasks: CapacityBounds,
    /// Peak users one fleet instance can absorb.
    pub users_per_instance: u32,
    /// Task replicas scheduled per fleet instance.
    pub tasks_per_instance: u32,
    pub scale_up_allowed: bool,
    pub scale_down_allowed: bool,
}

impl ScalingPolicy {
    /// Reject misconfigured policies before any remote call is made.
    pub fn validate(&self) -> ScaleResult<()> {
        self.fleet.validate("fleet")?;
        self.tasks.validate("task")?;
        if self.users_per_instance == 0 {
            return Err(ScaleError::InvalidPolicy(
                "users_per_instance must be positive".to_string(),
            ));
        }
        if self.tasks_per_instance == 0 {
            return Err(ScaleError::InvalidPolicy(
                "tasks_per_instance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Decision ───────────────────────────────────────────────────────

/// Arbiter output: target sizes for both resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub fleet_capacity: u32,
    pub task_count: u32,
}

impl Recommendation {
    /// Enforce policy bounds on both resources independently.
    pub fn clamp_to(&self, policy: &ScalingPolicy) -> Self {
        Self {
            fleet_capacity: policy.fleet.clamp(self.fleet_capacity),
            task_count: policy.tasks.clamp(self.task_count),
        }
    }
}

/// Direction of the required capacity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    ScaleUp,
    ScaleDown,
    NoChange,
}
