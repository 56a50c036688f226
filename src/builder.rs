use super::{Error, NamespaceSuffix, Publisher, PublisherConfig, Transport};
use std::sync::Arc;

/// Builder for the CloudWatch function metrics [Publisher]
///
/// Unset fields fall back to `us-east-1`, `CustomProjectMetrics` and `development`, giving the
/// namespace `CustomProjectMetrics/development/Metrics`
///
/// # Example
/// ```
///  let metrics = cloudwatch_function_metrics::Builder::new()
///      .project_name("MyApplication")
///      .stage("production")
///      .transport(cloudwatch_function_metrics::EmfTransport::stdout())
///      .build()
///      .unwrap();
///
///  assert_eq!(metrics.namespace(), "MyApplication/production/Metrics");
/// ```
#[derive(Default)]
pub struct Builder {
    config: PublisherConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. [PublisherConfig::from_env]
    pub fn from_config(config: PublisherConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Sets the AWS region the CloudWatch client connects to
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Sets the first namespace segment
    pub fn project_name(mut self, project_name: impl Into<String>) -> Self {
        self.config.project_name = project_name.into();
        self
    }

    /// Sets the second namespace segment
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.config.stage = stage.into();
        self
    }

    /// Sets the last namespace segment
    pub fn namespace_suffix(mut self, suffix: NamespaceSuffix) -> Self {
        self.config.namespace_suffix = suffix;
        self
    }

    /// Stamps every datum with the given milliseconds since the epoch instead of now
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.config.timestamp = Some(timestamp);
        self
    }

    /// Sets the transport data points are submitted through
    /// * Must be set or build() will return Err("transport missing")
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Private helper for consuming the builder into publisher configuration
    fn config(self) -> (PublisherConfig, Option<Arc<dyn Transport>>) {
        (self.config, self.transport)
    }

    /// Build a publisher bound to the configured transport
    pub fn build(self) -> Result<Publisher, Error> {
        let (config, transport) = self.config();
        let transport = transport.ok_or("transport missing")?;
        Ok(Publisher::from_shared(config, transport))
    }

    /// Build a publisher, connecting a [CloudWatchTransport](super::CloudWatchTransport) for the
    /// configured region unless another transport was set
    #[cfg(feature = "cloudwatch")]
    pub async fn init(self) -> Publisher {
        let (config, transport) = self.config();
        match transport {
            Some(transport) => Publisher::from_shared(config, transport),
            None => Publisher::connect(config).await,
        }
    }
}
