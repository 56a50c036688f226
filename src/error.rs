//! # Error
//!
//! Failures surfaced by [Publisher](super::Publisher), tagged with the operation that failed

use super::Error;
use std::fmt;
use thiserror::Error;

/// The publish operation a [PublishError] came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    FunctionInvocation,
    FunctionError,
    CustomMetric,
    CustomMetricWithDimensions,
}

impl Operation {
    /// Stable error code, never reused across operations
    pub fn code(self) -> &'static str {
        match self {
            Operation::FunctionInvocation => "500.1",
            Operation::FunctionError => "500.2",
            Operation::CustomMetric => "500.3",
            Operation::CustomMetricWithDimensions => "500.4",
        }
    }

    /// Message safe to hand to an API client
    pub fn client_message(self) -> &'static str {
        match self {
            Operation::FunctionInvocation => "Failed to send metric data",
            Operation::FunctionError => "Failed to send metric error data",
            Operation::CustomMetric => "Failed to send custom metric data",
            Operation::CustomMetricWithDimensions => "Failed to send custom metric dimensions data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FunctionInvocation => "function invocation",
            Operation::FunctionError => "function error",
            Operation::CustomMetric => "custom metric",
            Operation::CustomMetricWithDimensions => "custom metric with dimensions",
        };
        f.write_str(name)
    }
}

/// A data point could not be submitted
///
/// Transient and permanent transport failures are not distinguished, the original error is
/// kept as [std::error::Error::source]
#[derive(Debug, Error)]
#[error("{} [{}]: {source}", .operation.client_message(), .operation.code())]
pub struct PublishError {
    operation: Operation,
    #[source]
    source: Error,
}

impl PublishError {
    pub fn new(operation: Operation, source: impl Into<Error>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn code(&self) -> &'static str {
        self.operation.code()
    }

    /// Every publish failure maps to an internal server error
    pub fn http_status(&self) -> u16 {
        500
    }

    pub fn client_message(&self) -> &'static str {
        self.operation.client_message()
    }

    /// Display text of the original transport error
    pub fn internal_message(&self) -> String {
        self.source.to_string()
    }

    /// The original transport error
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_source(self) -> Error {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn codes_are_distinct() {
        let operations = [
            Operation::FunctionInvocation,
            Operation::FunctionError,
            Operation::CustomMetric,
            Operation::CustomMetricWithDimensions,
        ];
        let mut codes: Vec<_> = operations.iter().map(|op| op.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), operations.len());
    }

    #[test]
    fn wraps_source() {
        let error = PublishError::new(Operation::FunctionError, "throttled");

        assert_eq!(error.operation(), Operation::FunctionError);
        assert_eq!(error.code(), "500.2");
        assert_eq!(error.http_status(), 500);
        assert_eq!(error.client_message(), "Failed to send metric error data");
        assert_eq!(error.internal_message(), "throttled");
        assert_eq!(error.source().unwrap().to_string(), "throttled");
        assert_eq!(error.to_string(), "Failed to send metric error data [500.2]: throttled");
    }
}
