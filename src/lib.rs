//! Function invocation, error and custom counters for AWS CloudWatch
//!
//! Every metric is a single `Count` data point with value `1`, published under the namespace
//! `"{project}/{stage}/{suffix}"`.
//!
//! # Example
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let metrics = cloudwatch_function_metrics::Builder::new()
//!     .region("eu-west-1")
//!     .project_name("Orders")
//!     .stage("production")
//!     .init()
//!     .await;
//!
//! metrics.record_function_invocation("create_order").await?;
//! # Ok(())
//! # }
//! ```

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use {
    builder::Builder,
    datum::{Dimension, MetricDatum, DIMENSION_ERROR_TYPE, DIMENSION_FUNCTION_NAME, FUNCTION_ERROR, FUNCTION_INVOCATION},
    emf::EmfTransport,
    error::{Operation, PublishError},
    publisher::{NamespaceSuffix, Publisher, PublisherConfig, DEFAULT_PROJECT_NAME, DEFAULT_REGION, DEFAULT_STAGE},
    transport::Transport,
};

#[cfg(feature = "cloudwatch")]
pub use cloudwatch::CloudWatchTransport;

mod builder;
#[cfg(feature = "cloudwatch")]
mod cloudwatch;
mod datum;
mod emf;
mod error;
mod publisher;
#[cfg(feature = "tower")]
pub mod service;
mod transport;
