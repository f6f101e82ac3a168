use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use tracing::info;
use vows_core::SiteConfig;
use vows_core::utils::init_tracing;
use vows_worker::WorkerContext;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!(version = vows_core::VERSION, "Starting Vows worker Lambda function");

    let config = SiteConfig::from_env()?;
    let ctx = WorkerContext::new(&config).await?;

    run(service_fn(|event: LambdaEvent<Value>| {
        let ctx = ctx.clone();
        async move { vows_worker::handler(ctx, event).await }
    }))
    .await
}
