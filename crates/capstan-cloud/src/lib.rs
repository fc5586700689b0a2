//! capstan-cloud — control-plane contracts for the capstan autoscaler.
//!
//! The scaling core never talks to a vendor SDK directly. It sees three
//! narrow contracts: a metric source, the fleet control plane, and the
//! task-scheduler control plane. This crate defines those contracts and
//! ships thin HTTP implementations of each — plain REST wrappers with no
//! decision logic, no retries, and fire-and-forget writes.
//!
//! Reads report the plane's current view; writes only carry an
//! acknowledgment. Convergence is verified by the *next* scheduled
//! invocation re-reading live state, never by in-process polling.

pub mod fleet;
pub mod metric;
pub mod tasks;
pub mod transport;

#[cfg(test)]
pub(crate) mod testserver;

use std::time::Duration;

use async_trait::async_trait;

use capstan_core::{ClusterMembership, FleetState, ScaleResult, TaskGroupState};

pub use fleet::HttpFleetControl;
pub use metric::HttpMetricSource;
pub use tasks::HttpTaskGroupControl;

/// Source of the load metric driving scaling decisions.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Raw samples observed over the trailing window.
    ///
    /// Returns the series as-is; aggregation and validity checks are the
    /// caller's concern (`MetricSample::peak_of`).
    async fn fetch_samples(&self, window: Duration) -> ScaleResult<Vec<f64>>;
}

/// Control plane for the VM fleet.
#[async_trait]
pub trait FleetControl: Send + Sync {
    /// Current desired capacity. Fails with `FleetNotFound` if the fleet
    /// is unknown to the plane.
    async fn describe(&self) -> ScaleResult<FleetState>;

    /// Request a new desired capacity. Acknowledgment only — the plane
    /// launches or terminates instances asynchronously.
    async fn set_desired_capacity(&self, capacity: u32) -> ScaleResult<()>;
}

/// Control plane for the task scheduler: cluster membership plus the
/// managed task group.
#[async_trait]
pub trait TaskGroupControl: Send + Sync {
    /// How many fleet instances are registered with the cluster.
    async fn cluster_membership(&self) -> ScaleResult<ClusterMembership>;

    /// Desired and running task counts for the managed group.
    async fn describe(&self) -> ScaleResult<TaskGroupState>;

    /// Request a new desired task count. Acknowledgment only — the
    /// scheduler places or drains tasks asynchronously.
    async fn set_desired_count(&self, count: u32) -> ScaleResult<()>;
}
