//! # EMF
//!
//! Publishes data points as CloudWatch Embedded Metrics, serialized via serde_json
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html>

use super::{Error, MetricDatum, Transport};
use futures::future::{self, BoxFuture};
use serde::Serialize;
use serde_json::value::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Serialize)]
pub struct EmbeddedMetrics<'a> {
    #[serde(rename = "_aws")]
    pub aws: EmbeddedMetricsAws<'a>,
    #[serde(flatten)]
    pub dimensions: BTreeMap<&'a str, &'a str>,
    #[serde(flatten)]
    pub values: BTreeMap<&'a str, Value>,
}

#[derive(Serialize)]
pub struct EmbeddedMetricsAws<'a> {
    #[serde(rename = "Timestamp")]
    pub timestamp: u64,
    // One datum per document, so one namespace
    #[serde(rename = "CloudWatchMetrics")]
    pub cloudwatch_metrics: [EmbeddedNamespace<'a>; 1],
}

#[derive(Serialize)]
pub struct EmbeddedNamespace<'a> {
    #[serde(rename = "Namespace")]
    pub namespace: &'a str,
    // A single dimension set holding the datum's dimensions in call order
    #[serde(rename = "Dimensions")]
    pub dimensions: [Vec<&'a str>; 1],
    #[serde(rename = "Metrics")]
    pub metrics: Vec<EmbeddedMetric<'a>>,
}

#[derive(Serialize)]
pub struct EmbeddedMetric<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Unit")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'a str>,
}

impl<'a> EmbeddedMetrics<'a> {
    /// Build the document for a single datum
    ///
    /// Dimensions and the metric value share one JSON object, so every key must be unique and
    /// none may be `_aws`
    pub fn from_datum(namespace: &'a str, datum: &'a MetricDatum) -> std::io::Result<Self> {
        if datum.metric_name() == AWS_KEY {
            return Err(invalid_key(datum.metric_name()));
        }
        let mut emf = EmbeddedMetrics {
            aws: EmbeddedMetricsAws {
                timestamp: datum.timestamp_millis(),
                cloudwatch_metrics: [EmbeddedNamespace {
                    namespace,
                    dimensions: [Vec::with_capacity(datum.dimensions().len())],
                    metrics: Vec::with_capacity(1),
                }],
            },
            dimensions: BTreeMap::new(),
            values: BTreeMap::new(),
        };

        for dimension in datum.dimensions() {
            if dimension.name == AWS_KEY
                || dimension.name == datum.metric_name()
                || emf.dimensions.contains_key(dimension.name.as_str())
            {
                return Err(invalid_key(&dimension.name));
            }
            emf.aws.cloudwatch_metrics[0].dimensions[0].push(&dimension.name);
            emf.dimensions.insert(&dimension.name, &dimension.value);
        }

        emf.aws.cloudwatch_metrics[0].metrics.push(EmbeddedMetric {
            name: datum.metric_name(),
            unit: Some(unit_to_str(&datum.unit())),
        });
        emf.values.insert(datum.metric_name(), datum.value().into());

        Ok(emf)
    }
}

/// Reserved for the metadata object
const AWS_KEY: &str = "_aws";

fn invalid_key(key: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("embedded metric key {key:?} is reserved or used twice"),
    )
}

/// Convert a metrics::Unit into the cloudwatch string
///
/// <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_MetricDatum.html>
pub fn unit_to_str(unit: &metrics::Unit) -> &'static str {
    match unit {
        metrics::Unit::Count => "Count",
        metrics::Unit::Percent => "Percent",
        metrics::Unit::Seconds => "Seconds",
        metrics::Unit::Milliseconds => "Milliseconds",
        metrics::Unit::Microseconds => "Microseconds",
        metrics::Unit::Nanoseconds => "Nanoseconds",
        metrics::Unit::Tebibytes => "Terabytes",
        metrics::Unit::Gibibytes => "Gigabytes",
        metrics::Unit::Mebibytes => "Megabytes",
        metrics::Unit::Kibibytes => "Kilobytes",
        metrics::Unit::Bytes => "Bytes",
        metrics::Unit::TerabitsPerSecond => "Terabits/Second",
        metrics::Unit::GigabitsPerSecond => "Gigabits/Second",
        metrics::Unit::MegabitsPerSecond => "Megabits/Second",
        metrics::Unit::KilobitsPerSecond => "Kilobits/Second",
        metrics::Unit::BitsPerSecond => "Bits/Second",
        metrics::Unit::CountPerSecond => "Count/Second",
    }
}

/// [Transport] writing one Embedded Metric Format line per datum to an implementation of
/// [std::io::Write]
///
/// Inside AWS Lambda, stdout lands in CloudWatch Logs which extracts the metrics without a
/// PutMetricData call
///
/// # Example
/// ```
/// let metrics = cloudwatch_function_metrics::Builder::new()
///     .project_name("MyApplication")
///     .transport(cloudwatch_function_metrics::EmfTransport::stdout())
///     .build()
///     .unwrap();
/// ```
pub struct EmfTransport<W> {
    writer: Mutex<W>,
}

impl EmfTransport<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> EmfTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write the document for a single datum, followed by a newline
    pub fn write_datum(&self, namespace: &str, datum: &MetricDatum) -> std::io::Result<()> {
        let emf = EmbeddedMetrics::from_datum(namespace, datum)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, &emf)?;
        writeln!(writer)?;
        writer.flush()
    }
}

impl<W: Write + Send + 'static> Transport for EmfTransport<W> {
    fn put_metric_data<'a>(&'a self, namespace: &'a str, datum: &'a MetricDatum) -> BoxFuture<'a, Result<(), Error>> {
        debug!(namespace, metric = datum.metric_name(), "writing embedded metric");
        let result = self.write_datum(namespace, datum).map_err(Error::from);
        Box::pin(future::ready(result))
    }
}
