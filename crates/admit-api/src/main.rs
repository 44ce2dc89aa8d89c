//! Admit Stack API server binary.

use tracing_subscriber::EnvFilter;

use admit_api::config::AppConfig;
use admit_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let state = AppState::in_memory(config);
    let app = admit_api::app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "admit-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
