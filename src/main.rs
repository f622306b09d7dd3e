/// Identity Bridge - host-facing DID identity command surface
use identity_bridge::{config::BridgeConfig, context::BridgeContext, error::BridgeResult, host};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> BridgeResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("identity bridge starting");

    // Load configuration and assemble shared services
    let config = BridgeConfig::from_env()?;
    let ctx = BridgeContext::new(config)?;

    // Serve the host until exit/EOF/interrupt
    host::run(ctx).await?;

    tracing::info!("identity bridge terminated");
    Ok(())
}
