use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

mod app;
mod app_state;
mod config;
mod db;
mod error;
mod middleware;
mod modules;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let telemetry = telemetry::init_telemetry(None).await?;

    let env = config::Config::from_env()?;
    let pool = db::init_pool(&env.database)
        .await
        .context("Failed to initialize database pool")?;

    let addr = env.server_addr();
    let state = app_state::AppState::new(pool, env.clone());

    info!("{} listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app::create_router(state))
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown().await?;

    Ok(())
}
