use anyhow::Context;

use postboard_api::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    postboard_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        ttl_secs = config.token.ttl.as_secs(),
        hub_queue_capacity = config.hub_queue_capacity,
        "configuration loaded"
    );

    let app = postboard_api::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
