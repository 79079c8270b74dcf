use std::net::SocketAddr;

use anyhow::Context;
use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::config::Config;
use todo_api::domain::repository::TodoRepository;
use todo_api::http::{routes::todos, routing};
use todo_api::infrastructure::sqlite_repo::SqliteTodoRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    let repo = SqliteTodoRepository::connect_with(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("opening {}", config.database.url))?;
    repo.init().await.context("creating todo schema")?;
    let service = TodoServiceImpl::new(repo);
    let router = routing::app(todos::router(todos::AppState { service }));

    let addr: SocketAddr = config.server_addr().parse().with_context(|| format!("invalid server address {}", config.server_addr()))?;
    tracing::info!(%addr, base = todos::BASE_PATH, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
