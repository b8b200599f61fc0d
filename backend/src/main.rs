use backend::config::Config;
use backend::table::RedisTable;
use backend::{app, AppState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("backend=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::from_env();
    let table = RedisTable::open(&config.redis_url)?;
    let router = app(AppState::new(table), &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, redis = %config.redis_url, "server running");
    axum::serve(listener, router).await?;
    Ok(())
}
