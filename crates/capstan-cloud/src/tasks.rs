//! Task-scheduler control plane client.
//!
//! One client covers both scheduler reads the core needs: cluster
//! membership (how many fleet instances have registered) and the managed
//! task group's desired/running counts.

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use capstan_core::config::TaskGroupConfig;
use capstan_core::{ClusterMembership, ScaleError, ScaleResult, TaskGroupState};

use crate::TaskGroupControl;
use crate::transport;

/// Wire shape of the scheduler's cluster describe response.
#[derive(Debug, Deserialize)]
struct ClusterDescription {
    registered_instances: u32,
}

/// Wire shape of the scheduler's task-group describe response.
#[derive(Debug, Deserialize)]
struct TaskGroupDescription {
    desired_count: u32,
    running_count: u32,
}

#[derive(Debug, Serialize)]
struct SetCountRequest {
    desired_count: u32,
}

/// Task-scheduler control plane client over a REST endpoint.
pub struct HttpTaskGroupControl {
    address: String,
    cluster_name: String,
    group_name: String,
}

impl HttpTaskGroupControl {
    pub fn new(config: &TaskGroupConfig) -> Self {
        Self {
            address: config.address.clone(),
            cluster_name: config.cluster_name.clone(),
            group_name: config.group_name.clone(),
        }
    }

    fn group_path(&self) -> String {
        format!(
            "/clusters/{}/task-groups/{}",
            self.cluster_name, self.group_name
        )
    }
}

#[async_trait]
impl TaskGroupControl for HttpTaskGroupControl {
    async fn cluster_membership(&self) -> ScaleResult<ClusterMembership> {
        let path = format!("/clusters/{}", self.cluster_name);
        let (status, body) = transport::get(&self.address, &path).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::ClusterNotFound(self.cluster_name.clone()));
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "task plane returned {status}"
            )));
        }

        let desc: ClusterDescription = transport::decode(&body)?;
        Ok(ClusterMembership {
            registered_instances: desc.registered_instances,
        })
    }

    async fn describe(&self) -> ScaleResult<TaskGroupState> {
        let (status, body) = transport::get(&self.address, &self.group_path()).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::TaskGroupNotFound(self.group_name.clone()));
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "task plane returned {status}"
            )));
        }

        let desc: TaskGroupDescription = transport::decode(&body)?;
        Ok(TaskGroupState {
            desired_count: desc.desired_count,
            running_count: desc.running_count,
        })
    }

    async fn set_desired_count(&self, count: u32) -> ScaleResult<()> {
        let path = format!("{}/desired-count", self.group_path());
        let (status, _) = transport::post_json(
            &self.address,
            &path,
            &SetCountRequest {
                desired_count: count,
            },
        )
        .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::TaskGroupNotFound(self.group_name.clone()));
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "task count update rejected: {status}"
            )));
        }

        debug!(group = %self.group_name, count, "task count update accepted");
        Ok(())
    }
}
