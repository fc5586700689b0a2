//! capstan.toml configuration parser.
//!
//! The whole configuration is loaded and validated once per process and
//! passed into components by reference — nothing in capstan reads ambient
//! environment state directly.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ScaleError, ScaleResult};
use crate::types::{CapacityBounds, ScalingPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapstanConfig {
    pub policy: PolicyConfig,
    pub metric: MetricConfig,
    pub fleet: FleetConfig,
    pub tasks: TaskGroupConfig,
}

/// Scaling bounds, ratios, and permission flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub min_fleet: u32,
    pub max_fleet: u32,
    pub min_tasks: u32,
    pub max_tasks: u32,
    /// Peak users one fleet instance can absorb.
    pub users_per_instance: u32,
    /// Task replicas scheduled per fleet instance.
    pub tasks_per_instance: u32,
    #[serde(default = "default_true")]
    pub scale_up_allowed: bool,
    #[serde(default = "default_true")]
    pub scale_down_allowed: bool,
}

/// Where to read the load metric from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Metric plane address (host:port).
    pub address: String,
    /// Query path for the sample series.
    pub query_path: String,
    /// Trailing window, e.g. "300s" or "5m".
    pub window: String,
}

/// Fleet control plane endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Fleet plane address (host:port).
    pub address: String,
    pub fleet_name: String,
}

/// Task-scheduler control plane endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroupConfig {
    /// Task plane address (host:port).
    pub address: String,
    pub cluster_name: String,
    pub group_name: String,
}

fn default_true() -> bool {
    true
}

impl CapstanConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CapstanConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the validated scaling policy for this invocation.
    pub fn scaling_policy(&self) -> ScaleResult<ScalingPolicy> {
        let policy = ScalingPolicy {
            fleet: CapacityBounds {
                min: self.policy.min_fleet,
                max: self.policy.max_fleet,
            },
            tasks: CapacityBounds {
                min: self.policy.min_tasks,
                max: self.policy.max_tasks,
            },
            users_per_instance: self.policy.users_per_instance,
            tasks_per_instance: self.policy.tasks_per_instance,
            scale_up_allowed: self.policy.scale_up_allowed,
            scale_down_allowed: self.policy.scale_down_allowed,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Trailing metric window as a `Duration`.
    pub fn metric_window(&self) -> ScaleResult<Duration> {
        parse_duration(&self.metric.window).ok_or_else(|| {
            ScaleError::InvalidPolicy(format!(
                "unparseable metric window {:?}",
                self.metric.window
            ))
        })
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[policy]
min_fleet = 2
max_fleet = 10
min_tasks = 2
max_tasks = 20
users_per_instance = 20
tasks_per_instance = 2

[metric]
address = "127.0.0.1:9402"
query_path = "/metrics/active-users"
window = "300s"

[fleet]
address = "127.0.0.1:9400"
fleet_name = "web-fleet"

[tasks]
address = "127.0.0.1:9401"
cluster_name = "web-cluster"
group_name = "web-tasks"
"#;

    #[test]
    fn parse_sample_config() {
        let config: CapstanConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.policy.max_fleet, 10);
        assert_eq!(config.fleet.fleet_name, "web-fleet");
        assert_eq!(config.tasks.group_name, "web-tasks");
        // Permission flags default to allowed when omitted.
        assert!(config.policy.scale_up_allowed);
        assert!(config.policy.scale_down_allowed);
    }

    #[test]
    fn scaling_policy_is_validated() {
        let config: CapstanConfig = toml::from_str(SAMPLE).unwrap();
        let policy = config.scaling_policy().unwrap();
        assert_eq!(policy.fleet.min, 2);
        assert_eq!(policy.tasks.max, 20);

        let mut bad = config.clone();
        bad.policy.min_fleet = 12; // inverted against max_fleet = 10
        assert!(matches!(
            bad.scaling_policy(),
            Err(ScaleError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn metric_window_parses_suffixes() {
        let mut config: CapstanConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.metric_window().unwrap(), Duration::from_secs(300));

        config.metric.window = "5m".to_string();
        assert_eq!(config.metric_window().unwrap(), Duration::from_secs(300));

        config.metric.window = "bogus".to_string();
        assert!(config.metric_window().is_err());
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("oops"), None);
    }
}
