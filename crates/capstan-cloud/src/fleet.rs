//! Fleet control plane client.

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use capstan_core::config::FleetConfig;
use capstan_core::{FleetState, ScaleError, ScaleResult};

use crate::FleetControl;
use crate::transport;

/// Wire shape of the fleet plane's describe response.
#[derive(Debug, Deserialize)]
struct FleetDescription {
    desired_capacity: u32,
}

#[derive(Debug, Serialize)]
struct SetCapacityRequest {
    desired_capacity: u32,
}

/// Fleet control plane client over a REST endpoint.
pub struct HttpFleetControl {
    address: String,
    fleet_name: String,
}

impl HttpFleetControl {
    pub fn new(config: &FleetConfig) -> Self {
        Self {
            address: config.address.clone(),
            fleet_name: config.fleet_name.clone(),
        }
    }
}

#[async_trait]
impl FleetControl for HttpFleetControl {
    async fn describe(&self) -> ScaleResult<FleetState> {
        let path = format!("/fleets/{}", self.fleet_name);
        let (status, body) = transport::get(&self.address, &path).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::FleetNotFound(self.fleet_name.clone()));
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "fleet plane returned {status}"
            )));
        }

        let desc: FleetDescription = transport::decode(&body)?;
        Ok(FleetState {
            desired_capacity: desc.desired_capacity,
        })
    }

    async fn set_desired_capacity(&self, capacity: u32) -> ScaleResult<()> {
        let path = format!("/fleets/{}/desired-capacity", self.fleet_name);
        let (status, _) = transport::post_json(
            &self.address,
            &path,
            &SetCapacityRequest {
                desired_capacity: capacity,
            },
        )
        .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::FleetNotFound(self.fleet_name.clone()));
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "fleet capacity update rejected: {status}"
            )));
        }

        debug!(fleet = %self.fleet_name, capacity, "fleet capacity update accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testserver;

    fn config(address: String) -> FleetConfig {
        FleetConfig {
            address,
            fleet_name: "web-fleet".to_string(),
        }
    }

    #[test]
    fn fleet_description_decodes() {
        let desc: FleetDescription =
            serde_json::from_str(r#"{"desired_capacity": 4}"#).unwrap();
        assert_eq!(desc.desired_capacity, 4);
    }

    #[tokio::test]
    async fn describe_reads_desired_capacity() {
        let addr = testserver::spawn(vec![(
            "/fleets/web-fleet",
            200,
            r#"{"desired_capacity": 4}"#,
        )])
        .await;

        let fleet = HttpFleetControl::new(&config(addr.to_string()));
        let state = fleet.describe().await.unwrap();
        assert_eq!(state.desired_capacity, 4);
    }

    #[tokio::test]
    async fn unknown_fleet_maps_to_not_found() {
        let addr = testserver::spawn(vec![]).await;

        let fleet = HttpFleetControl::new(&config(addr.to_string()));
        let result = fleet.describe().await;
        assert!(matches!(result, Err(ScaleError::FleetNotFound(name)) if name == "web-fleet"));
    }

    #[tokio::test]
    async fn set_desired_capacity_is_acknowledged() {
        let addr = testserver::spawn(vec![(
            "/fleets/web-fleet/desired-capacity",
            200,
            "{}",
        )])
        .await;

        let fleet = HttpFleetControl::new(&config(addr.to_string()));
        fleet.set_desired_capacity(6).await.unwrap();
    }
}
