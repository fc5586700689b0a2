//! capstan-core — domain types for the capstan autoscaler.
//!
//! A capstan invocation is one read-decide-act pass over a pair of linked
//! resources: a VM **fleet** and a **task group** scheduled onto it. Nothing
//! here persists between passes — every invocation re-reads live state from
//! the control planes, and convergence happens across scheduled passes.
//!
//! This crate holds the types shared by every other capstan crate: the
//! observed resource states, the scaling policy with its capacity bounds,
//! the arbiter recommendation, the error taxonomy, and the `capstan.toml`
//! configuration parser.

pub mod config;
pub mod error;
pub mod types;

pub use config::CapstanConfig;
pub use error::{ScaleError, ScaleResult};
pub use types::*;
