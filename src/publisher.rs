//! # Publisher
//!
//! Builds one data point per call and submits it through the bound [Transport]

use super::datum::{DIMENSION_ERROR_TYPE, DIMENSION_FUNCTION_NAME, FUNCTION_ERROR, FUNCTION_INVOCATION};
use super::{Dimension, MetricDatum, Operation, PublishError, Transport};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PROJECT_NAME: &str = "CustomProjectMetrics";
pub const DEFAULT_STAGE: &str = "development";

/// Last segment of the namespace
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NamespaceSuffix {
    #[default]
    Metrics,
    Functions,
    Errors,
}

impl NamespaceSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            NamespaceSuffix::Metrics => "Metrics",
            NamespaceSuffix::Functions => "Functions",
            NamespaceSuffix::Errors => "Errors",
        }
    }
}

impl fmt::Display for NamespaceSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NamespaceSuffix {
    type Err = super::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Metrics" => Ok(NamespaceSuffix::Metrics),
            "Functions" => Ok(NamespaceSuffix::Functions),
            "Errors" => Ok(NamespaceSuffix::Errors),
            other => Err(format!("unknown namespace suffix {other:?}").into()),
        }
    }
}

/// Region, project and stage a [Publisher] is bound to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublisherConfig {
    pub region: String,
    pub project_name: String,
    pub stage: String,
    pub namespace_suffix: NamespaceSuffix,
    /// Fixed timestamp in milliseconds since the epoch, otherwise each datum is stamped with now
    pub timestamp: Option<u64>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            project_name: DEFAULT_PROJECT_NAME.to_owned(),
            stage: DEFAULT_STAGE.to_owned(),
            namespace_suffix: NamespaceSuffix::default(),
            timestamp: None,
        }
    }
}

impl PublisherConfig {
    /// Read `AWS_REGION`, `METRICS_PROJECT_NAME`, `METRICS_STAGE` and `METRICS_NAMESPACE_SUFFIX`,
    /// falling back to the defaults for unset or empty variables
    pub fn from_env() -> Result<Self, super::Error> {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|value| !value.is_empty())
        }

        let mut config = Self::default();
        if let Some(region) = var("AWS_REGION") {
            config.region = region;
        }
        if let Some(project_name) = var("METRICS_PROJECT_NAME") {
            config.project_name = project_name;
        }
        if let Some(stage) = var("METRICS_STAGE") {
            config.stage = stage;
        }
        if let Some(suffix) = var("METRICS_NAMESPACE_SUFFIX") {
            config.namespace_suffix = suffix.parse()?;
        }
        Ok(config)
    }

    /// `"{project}/{stage}/{suffix}"`
    pub fn namespace(&self) -> String {
        format!("{}/{}/{}", self.project_name, self.stage, self.namespace_suffix)
    }
}

/// Everything a single publish call reads, swapped as a unit
struct Binding {
    config: PublisherConfig,
    namespace: String,
    transport: Arc<dyn Transport>,
}

impl Binding {
    fn new(config: PublisherConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            namespace: config.namespace(),
            config,
            transport,
        }
    }

    fn timestamp(&self) -> SystemTime {
        match self.config.timestamp {
            Some(t) => UNIX_EPOCH + Duration::from_millis(t),
            None => SystemTime::now(),
        }
    }
}

/// Publishes function invocation, error and custom counters
///
/// Use [Builder](super::Builder) to construct. Clones share the same binding.
///
/// Each call snapshots the binding when it starts. [rebind](Publisher::rebind) while calls are
/// in flight lets them finish against the old namespace and transport, later calls see the new
/// one. Calls are never retried and carry no timeout, wrap them in `tokio::time::timeout` if a
/// hung transport matters.
#[derive(Clone)]
pub struct Publisher {
    binding: Arc<ArcSwap<Binding>>,
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.binding.load();
        f.debug_struct("Publisher")
            .field("config", &binding.config)
            .field("namespace", &binding.namespace)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    pub fn new(config: PublisherConfig, transport: impl Transport) -> Self {
        Self::from_shared(config, Arc::new(transport))
    }

    pub fn from_shared(config: PublisherConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            binding: Arc::new(ArcSwap::from_pointee(Binding::new(config, transport))),
        }
    }

    /// Replace configuration and transport for every clone of this publisher
    pub fn rebind(&self, config: PublisherConfig, transport: impl Transport) {
        self.rebind_shared(config, Arc::new(transport));
    }

    /// [rebind](Publisher::rebind) to a transport that is already shared
    pub fn rebind_shared(&self, config: PublisherConfig, transport: Arc<dyn Transport>) {
        debug!(namespace = %config.namespace(), region = %config.region, "rebinding publisher");
        self.binding.store(Arc::new(Binding::new(config, transport)));
    }

    /// Current namespace
    pub fn namespace(&self) -> String {
        self.binding.load().namespace.clone()
    }

    /// Current configuration
    pub fn config(&self) -> PublisherConfig {
        self.binding.load().config.clone()
    }

    /// Increase the `FunctionInvocation` count of `function_name` by 1
    pub async fn record_function_invocation(&self, function_name: &str) -> Result<(), PublishError> {
        let dimensions = vec![Dimension::new(DIMENSION_FUNCTION_NAME, function_name)];
        self.publish(Operation::FunctionInvocation, FUNCTION_INVOCATION, dimensions)
            .await
    }

    /// Increase the `FunctionError` count of `function_name` by 1, classified by `error_type`
    pub async fn record_function_error(&self, function_name: &str, error_type: &str) -> Result<(), PublishError> {
        let dimensions = vec![
            Dimension::new(DIMENSION_FUNCTION_NAME, function_name),
            Dimension::new(DIMENSION_ERROR_TYPE, error_type),
        ];
        self.publish(Operation::FunctionError, FUNCTION_ERROR, dimensions).await
    }

    /// Increase `metric_name` by 1 for `function_name`
    pub async fn record_custom_metric(&self, function_name: &str, metric_name: &str) -> Result<(), PublishError> {
        let dimensions = vec![Dimension::new(DIMENSION_FUNCTION_NAME, function_name)];
        self.publish(Operation::CustomMetric, metric_name, dimensions).await
    }

    /// Increase `metric_name` by 1 with exactly the given dimensions
    pub async fn record_custom_metric_with_dimensions<I>(
        &self,
        metric_name: &str,
        dimensions: I,
    ) -> Result<(), PublishError>
    where
        I: IntoIterator,
        I::Item: Into<Dimension>,
    {
        let dimensions = dimensions.into_iter().map(Into::into).collect();
        self.publish(Operation::CustomMetricWithDimensions, metric_name, dimensions)
            .await
    }

    async fn publish(
        &self,
        operation: Operation,
        metric_name: &str,
        dimensions: Vec<Dimension>,
    ) -> Result<(), PublishError> {
        // Hold the snapshot for the whole call so a rebind can't split it
        let binding = self.binding.load_full();
        let datum = MetricDatum::count(metric_name, dimensions, binding.timestamp());

        debug!(
            namespace = %binding.namespace,
            metric = datum.metric_name(),
            dimensions = datum.dimensions().len(),
            "publishing metric"
        );

        binding
            .transport
            .put_metric_data(&binding.namespace, &datum)
            .await
            .map_err(|source| PublishError::new(operation, source))
    }
}
