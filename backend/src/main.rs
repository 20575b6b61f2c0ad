//! Backend entry-point: loads settings, applies migrations, wires adapters,
//! and serves the journey API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::JourneysSettings;
use backend::inbound::http::health::HealthState;
use backend::outbound::map_matching::MapboxMatchingSource;
use backend::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(error) = fmt().with_env_filter(filter).json().try_init() {
        warn!(%error, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = JourneysSettings::load_from_iter(std::env::args_os())
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let bind_addr = settings.bind_addr()?;
    let pool_config = settings.pool_config()?;

    let database_url = pool_config.database_url().to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .wrap_err("migration task failed to complete")??;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("build database pool")?;
    pool.ping().await.wrap_err("database ping")?;

    let matching_config = settings.map_matching_config()?;
    if matching_config.access_token.is_none() {
        warn!("map matching access token not configured; match requests will be rejected");
    }
    let map_matching =
        MapboxMatchingSource::new(matching_config).wrap_err("build map matching client")?;

    let config = ServerConfig::new(bind_addr, settings.engine_config())
        .with_db_pool(pool)
        .with_map_matching(map_matching);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "journeys backend listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("HTTP server terminated")
}
