use academy_admin::config::config;
use academy_admin::server::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Academy admin API in {:?} mode", config.environment);

    if academy_admin::is_development!() {
        tracing::warn!("development mode: tokens are signed with the built-in secret unless JWT_SECRET is set");
    } else if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let state = AppState::from_config(config).await?;
    tracing::info!(
        "{} resources registered, uploads stored in {}",
        state.catalog.registry.len(),
        state.uploads.dir().display()
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    println!("🚀 Academy admin API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config)).await?;
    Ok(())
}
