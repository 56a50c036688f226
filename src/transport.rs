use super::{Error, MetricDatum};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Submits one data point to a metrics backend
///
/// Implementations must not retry, a failed submission is reported once to the caller
pub trait Transport: Send + Sync + 'static {
    fn put_metric_data<'a>(&'a self, namespace: &'a str, datum: &'a MetricDatum) -> BoxFuture<'a, Result<(), Error>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn put_metric_data<'a>(&'a self, namespace: &'a str, datum: &'a MetricDatum) -> BoxFuture<'a, Result<(), Error>> {
        (**self).put_metric_data(namespace, datum)
    }
}
