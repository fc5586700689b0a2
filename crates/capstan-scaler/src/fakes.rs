//! In-memory control-plane fakes for core tests.
//!
//! Each fake reports a fixed observed state and records every desired-value
//! write it receives. Clones share the write log, so tests can hand a clone
//! to the engine and inspect writes afterwards.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use capstan_cloud::{FleetControl, MetricSource, TaskGroupControl};
use capstan_core::{ClusterMembership, FleetState, ScaleResult, TaskGroupState};

#[derive(Clone)]
pub(crate) struct FakeMetric {
    samples: Vec<f64>,
}

impl FakeMetric {
    pub fn new(samples: &[f64]) -> Self {
        Self {
            samples: samples.to_vec(),
        }
    }
}

#[async_trait]
impl MetricSource for FakeMetric {
    async fn fetch_samples(&self, _window: Duration) -> ScaleResult<Vec<f64>> {
        Ok(self.samples.clone())
    }
}

#[derive(Clone)]
pub(crate) struct FakeFleet {
    desired: u32,
    writes: Arc<Mutex<Vec<u32>>>,
}

impl FakeFleet {
    pub fn new(desired: u32) -> Self {
        Self {
            desired,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FleetControl for FakeFleet {
    async fn describe(&self) -> ScaleResult<FleetState> {
        Ok(FleetState {
            desired_capacity: self.desired,
        })
    }

    async fn set_desired_capacity(&self, capacity: u32) -> ScaleResult<()> {
        self.writes.lock().unwrap().push(capacity);
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct FakeTasks {
    registered: u32,
    desired: u32,
    running: u32,
    writes: Arc<Mutex<Vec<u32>>>,
}

impl FakeTasks {
    pub fn new(registered: u32, desired: u32, running: u32) -> Self {
        Self {
            registered,
            desired,
            running,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskGroupControl for FakeTasks {
    async fn cluster_membership(&self) -> ScaleResult<ClusterMembership> {
        Ok(ClusterMembership {
            registered_instances: self.registered,
        })
    }

    async fn describe(&self) -> ScaleResult<TaskGroupState> {
        Ok(TaskGroupState {
            desired_count: self.desired,
            running_count: self.running,
        })
    }

    async fn set_desired_count(&self, count: u32) -> ScaleResult<()> {
        self.writes.lock().unwrap().push(count);
        Ok(())
    }
}
