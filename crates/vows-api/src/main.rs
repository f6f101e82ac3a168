use lambda_http::{Error, Request, run, service_fn};
use tracing::info;
use vows_api::ApiContext;
use vows_core::SiteConfig;
use vows_core::utils::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!(version = vows_core::VERSION, "Starting Vows API Lambda function");

    // Configuration is read once per cold start
    let config = SiteConfig::from_env()?;
    let ctx = ApiContext::new(config).await?;

    // Run the Lambda runtime with our handler
    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { vows_api::handler(ctx, event).await }
    }))
    .await
}
