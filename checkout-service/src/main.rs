use checkout_service::config::CheckoutConfig;
use checkout_service::services::init_metrics;
use checkout_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CheckoutConfig::load().expect("Failed to load configuration");

    init_tracing(
        "checkout-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
