//! Error taxonomy for a capstan invocation.

use thiserror::Error;

/// Result type alias for scaling operations.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Errors that terminate a scaling invocation.
///
/// Every variant is fatal to the current pass — capstan never retries
/// internally. The external schedule re-runs the pass on its own cadence.
#[derive(Debug, Error)]
pub enum ScaleError {
    /// The metric window held no samples, or only zero samples.
    ///
    /// A zero reading is indistinguishable from a broken metric pipeline,
    /// so it is treated as a fetch failure rather than "no load".
    #[error("metric window returned no usable samples")]
    MetricUnavailable,

    #[error("fleet not found: {0}")]
    FleetNotFound(String),

    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("task group not found: {0}")]
    TaskGroupNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid scaling policy: {0}")]
    InvalidPolicy(String),

    #[error("scale-up is not permitted by policy")]
    ScaleUpNotPermitted,

    #[error("scale-down is not permitted by policy")]
    ScaleDownNotPermitted,

    #[error("control plane transport error: {0}")]
    Transport(String),
}
