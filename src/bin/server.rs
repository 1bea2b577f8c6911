use anyhow::Context;
use trivia_api::settings::Settings;
use trivia_api::{db, server::app::run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_tracing(&settings.log_level);

    let pool = db::establish_connection(&settings.database_url)
        .await
        .context("Cannot connect to DB")?;
    tracing::info!("Running db migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    run_server(pool, &settings).await
}
