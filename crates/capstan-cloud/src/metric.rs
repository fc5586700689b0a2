//! Load-metric source client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use capstan_core::config::MetricConfig;
use capstan_core::{ScaleError, ScaleResult};

use http::StatusCode;

use crate::MetricSource;
use crate::transport;

/// Wire shape of the metric plane's sample-series response.
#[derive(Debug, Deserialize)]
struct SampleSeries {
    samples: Vec<f64>,
}

/// Metric source backed by a REST metric plane.
///
/// Queries `GET {query_path}?window={secs}s` and returns the raw sample
/// series for the trailing window.
pub struct HttpMetricSource {
    address: String,
    query_path: String,
}

impl HttpMetricSource {
    pub fn new(config: &MetricConfig) -> Self {
        Self {
            address: config.address.clone(),
            query_path: config.query_path.clone(),
        }
    }
}

#[async_trait]
impl MetricSource for HttpMetricSource {
    async fn fetch_samples(&self, window: Duration) -> ScaleResult<Vec<f64>> {
        let path = format!("{}?window={}s", self.query_path, window.as_secs());
        let (status, body) = transport::get(&self.address, &path).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ScaleError::MetricUnavailable);
        }
        if !status.is_success() {
            return Err(ScaleError::Transport(format!(
                "metric plane returned {status}"
            )));
        }

        let series: SampleSeries = transport::decode(&body)?;
        Ok(series.samples)
    }
}
