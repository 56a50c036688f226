//! # Datum
//!
//! A single CloudWatch data point and the fixed names used by the publisher
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_MetricDatum.html>

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Metric name for function invocation counters
pub const FUNCTION_INVOCATION: &str = "FunctionInvocation";

/// Metric name for function error counters
pub const FUNCTION_ERROR: &str = "FunctionError";

/// Dimension carried by every function scoped metric
pub const DIMENSION_FUNCTION_NAME: &str = "FunctionName";

/// Dimension carried by error metrics only
pub const DIMENSION_ERROR_TYPE: &str = "ErrorType";

/// A (name, value) pair sub-classifying a metric's data points
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Dimension {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// One data point as submitted to a [Transport](super::Transport)
///
/// Built once per publish call and dropped after submission
#[derive(Clone, Debug, PartialEq)]
pub struct MetricDatum {
    metric_name: String,
    dimensions: Vec<Dimension>,
    unit: metrics::Unit,
    value: f64,
    timestamp: SystemTime,
}

impl MetricDatum {
    /// A `Count` data point of value 1, the only shape the publisher emits
    pub fn count(metric_name: impl Into<String>, dimensions: Vec<Dimension>, timestamp: SystemTime) -> Self {
        Self {
            metric_name: metric_name.into(),
            dimensions,
            unit: metrics::Unit::Count,
            value: 1.0,
            timestamp,
        }
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn unit(&self) -> metrics::Unit {
        self.unit
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Milliseconds since the unix epoch, clamped to 0 for pre-epoch clocks
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}
