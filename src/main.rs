use anyhow::Context;
use plugin_relay::api::{AppState, create_router};
use plugin_relay::config::Config;
use plugin_relay::formatter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing subscriber (log crate records are bridged into it)
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true)
        .init();

    formatter::init();

    let state = AppState::from_config(&config).context("failed to build http client")?;
    let app = create_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    log::info!(
        "listening on {} (prefix: {:?})",
        config.listen_address,
        config.route_prefix().unwrap_or_default()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("shutting down");
        })
        .await?;
    Ok(())
}
