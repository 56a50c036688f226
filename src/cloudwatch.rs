//! # CloudWatch
//!
//! [Transport] calling the CloudWatch PutMetricData API, one request per datum
//!
//! *this module requires the `cloudwatch` feature flag*

use super::emf::unit_to_str;
use super::{Error, MetricDatum, Publisher, PublisherConfig, Transport};
use aws_sdk_cloudwatch::config::Region;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum as CloudWatchDatum, StandardUnit};
use futures::future::BoxFuture;
use tracing::debug;

/// PutMetricData over the AWS SDK
///
/// Credentials come from the default AWS provider chain (environment, profile, instance or task
/// role), this crate never reads them itself
#[derive(Clone, Debug)]
pub struct CloudWatchTransport {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchTransport {
    pub fn new(client: aws_sdk_cloudwatch::Client) -> Self {
        Self { client }
    }

    /// Load the shared AWS configuration for `region` and create a client from it
    pub async fn connect(region: impl Into<String>) -> Self {
        let shared = aws_config::from_env().region(Region::new(region.into())).load().await;
        Self::new(aws_sdk_cloudwatch::Client::new(&shared))
    }

    fn to_cloudwatch(datum: &MetricDatum) -> CloudWatchDatum {
        let dimensions = datum
            .dimensions()
            .iter()
            .map(|dimension| Dimension::builder().name(&dimension.name).value(&dimension.value).build())
            .collect();

        CloudWatchDatum::builder()
            .metric_name(datum.metric_name())
            .set_dimensions(Some(dimensions))
            .unit(StandardUnit::from(unit_to_str(&datum.unit())))
            .value(datum.value())
            .timestamp(DateTime::from(datum.timestamp()))
            .build()
    }

    async fn put(&self, namespace: &str, datum: &MetricDatum) -> Result<(), Error> {
        let output = self
            .client
            .put_metric_data()
            .namespace(namespace)
            .metric_data(Self::to_cloudwatch(datum))
            .send()
            .await?;
        debug!(namespace, metric = datum.metric_name(), ?output, "put metric data");
        Ok(())
    }
}

impl Transport for CloudWatchTransport {
    fn put_metric_data<'a>(&'a self, namespace: &'a str, datum: &'a MetricDatum) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(self.put(namespace, datum))
    }
}

impl Publisher {
    /// Publisher bound to a [CloudWatchTransport] for `config.region`
    pub async fn connect(config: PublisherConfig) -> Self {
        let transport = CloudWatchTransport::connect(config.region.clone()).await;
        Publisher::new(config, transport)
    }

    /// [rebind](Publisher::rebind) to a fresh [CloudWatchTransport] for `config.region`
    pub async fn reconnect(&self, config: PublisherConfig) {
        let transport = CloudWatchTransport::connect(config.region.clone()).await;
        self.rebind(config, transport);
    }
}
