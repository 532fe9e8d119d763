use std::net::SocketAddr;

use anyhow::Context;
use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    server::seed::seed_role_permissions(&db).await?;
    server::seed::seed_subjects(&db).await?;
    if let Some(admin) = &config.auth.bootstrap_admin {
        server::seed::seed_bootstrap_admin(&db, admin).await?;
    }
    server::seed::ensure_indexes(&db).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = server::build_router(AppState { db, config });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/swagger-ui and http://{}/scalar", addr, addr);
    axum::serve(listener, app).await?;

    Ok(())
}
