use std::sync::Arc;

use throme_server::{app, config::ServerConfig, AppState, VariantRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let registry = VariantRegistry::builtin();
    let config = ServerConfig::from_env(&registry)?;

    for variant in registry.iter() {
        info!(
            variant = variant.name,
            model = variant.fixed_model.unwrap_or("caller-selected"),
            "registered prompt variant"
        );
    }

    let addr = config.addr;
    let state = Arc::new(AppState::from_config(registry, &config));

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
