//! Observability infrastructure for rsperms.
//!
//! This module provides:
//! - Structured logging configuration
//! - Metric descriptions for the counters recorded by the domain

mod logging;
mod metrics;

pub use logging::{init_logging, json_subscriber, LoggingConfig};
pub use metrics::describe_metrics;
