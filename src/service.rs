//! [tower] middleware recording `FunctionInvocation` and `FunctionError` around a service
//!
//! *this module requires the `tower` feature flag*
//!
//! # Example
//! ```ignore
//! use cloudwatch_function_metrics::service::MetricsLayer;
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(MetricsLayer::new(publisher, "create_order"))
//!     .service_fn(create_order);
//! ```
//!
//! Publish failures are logged with `tracing::warn!` and never change the wrapped service's
//! result

use super::Publisher;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::warn;

type Classifier<E> = Arc<dyn Fn(&E) -> String + Send + Sync>;

/// Short type name of `E`, e.g. `std::io::Error` becomes `Error`
pub fn error_type_name<E>(_error: &E) -> String {
    let name = std::any::type_name::<E>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name).to_owned()
}

/// [tower::Layer] producing [MetricsService]
pub struct MetricsLayer<E> {
    publisher: Publisher,
    function_name: Arc<str>,
    classifier: Classifier<E>,
}

impl<E: 'static> MetricsLayer<E> {
    pub fn new(publisher: Publisher, function_name: impl Into<Arc<str>>) -> Self {
        Self {
            publisher,
            function_name: function_name.into(),
            classifier: Arc::new(error_type_name::<E>),
        }
    }

    /// Derive the `ErrorType` dimension from the inner service's error
    pub fn with_error_classifier(mut self, classifier: impl Fn(&E) -> String + Send + Sync + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }
}

impl<E> Clone for MetricsLayer<E> {
    fn clone(&self) -> Self {
        Self {
            publisher: self.publisher.clone(),
            function_name: self.function_name.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<S, E> tower::Layer<S> for MetricsLayer<E> {
    type Service = MetricsService<S, E>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            layer: self.clone(),
            inner,
        }
    }
}

/// [tower::Service] recording one invocation per call and one error per failed call
pub struct MetricsService<S, E> {
    layer: MetricsLayer<E>,
    inner: S,
}

impl<S: Clone, E> Clone for MetricsService<S, E> {
    fn clone(&self) -> Self {
        Self {
            layer: self.layer.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<S, E, Request> tower::Service<Request> for MetricsService<S, E>
where
    S: tower::Service<Request, Error = E>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    E: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<S::Response, E>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), E>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let layer = self.layer.clone();
        let inner = self.inner.call(req);

        Box::pin(async move {
            if let Err(err) = layer.publisher.record_function_invocation(&layer.function_name).await {
                warn!(function_name = %layer.function_name, error = %err, "failed to record invocation");
            }

            let result = inner.await;

            let error_type = result.as_ref().err().map(|error| (layer.classifier)(error));
            if let Some(error_type) = error_type {
                if let Err(err) = layer
                    .publisher
                    .record_function_error(&layer.function_name, &error_type)
                    .await
                {
                    warn!(function_name = %layer.function_name, error = %err, "failed to record error");
                }
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::RecordingTransport;
    use crate::{Dimension, PublisherConfig};
    use tower::{service_fn, Layer, ServiceExt};

    #[derive(Debug)]
    struct NotFound;

    #[tokio::test]
    async fn records_invocation_and_error() {
        let transport = RecordingTransport::default();
        let publisher = Publisher::new(PublisherConfig::default(), transport.clone());

        let service = MetricsLayer::<NotFound>::new(publisher, "lookup").layer(service_fn(|id: u32| async move {
            if id == 0 {
                Err(NotFound)
            } else {
                Ok(id)
            }
        }));

        assert_eq!(service.clone().oneshot(7).await.unwrap(), 7);
        assert!(service.oneshot(0).await.is_err());

        let sent = transport.sent();
        let names: Vec<_> = sent.iter().map(|(_, datum)| datum.metric_name().to_owned()).collect();
        assert_eq!(names, ["FunctionInvocation", "FunctionInvocation", "FunctionError"]);
        assert_eq!(
            sent[2].1.dimensions(),
            &[Dimension::new("FunctionName", "lookup"), Dimension::new("ErrorType", "NotFound")]
        );
    }

    #[tokio::test]
    async fn publish_failure_keeps_result() {
        let transport = RecordingTransport::failing("throttled");
        let publisher = Publisher::new(PublisherConfig::default(), transport.clone());

        let service = MetricsLayer::<&'static str>::new(publisher, "lookup")
            .with_error_classifier(|_: &&str| "Custom".to_owned())
            .layer(service_fn(|id: u32| async move { Err::<u32, &str>(if id == 0 { "zero" } else { "other" }) }));

        assert_eq!(service.oneshot(0).await.unwrap_err(), "zero");
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn short_type_names() {
        assert_eq!(error_type_name(&NotFound), "NotFound");
        assert_eq!(error_type_name(&std::io::Error::other("x")), "Error");
    }
}
