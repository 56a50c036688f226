#![allow(non_snake_case)]
use cloudwatch_function_metrics::{Builder, EmfTransport, Error, PublisherConfig};
use tracing::{info, warn};

#[derive(Debug)]
struct OrderRejected;

async fn create_order(quantity: u32) -> Result<u32, OrderRejected> {
    if quantity == 0 {
        Err(OrderRejected)
    } else {
        Ok(quantity)
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .compact()
        .init();

    // METRICS_EMF=1 writes embedded metrics to stdout instead of calling PutMetricData
    let builder = Builder::from_config(PublisherConfig::from_env()?);
    let metrics = if std::env::var("METRICS_EMF").is_ok() {
        builder.transport(EmfTransport::stdout()).build()?
    } else {
        builder.init().await
    };
    info!(namespace = %metrics.namespace(), "publishing");

    for quantity in [3, 0] {
        metrics.record_function_invocation("create_order").await?;
        match create_order(quantity).await {
            Ok(created) => info!(created, "order created"),
            Err(err) => {
                warn!(?err, "order rejected");
                metrics.record_function_error("create_order", "OrderRejected").await?;
            }
        }
    }

    metrics
        .record_custom_metric_with_dimensions("Latency", [("Region", metrics.config().region)])
        .await?;

    Ok(())
}
