//! FitTrack entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fittrack::config::AppSettings;
use fittrack::inbound::http::health::HealthState;
use fittrack::outbound::persistence::{DbPool, apply_migrations};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load settings")?;
    let mut config = ServerConfig::new(settings.bind_addr()?);

    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations {
            let applied = apply_migrations(pool_config.database_url())
                .await
                .wrap_err("apply migrations")?;
            info!(applied, "database schema up to date");
        }
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("connect to database")?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(server::build_prometheus());
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("start server")?;
    server.await.wrap_err("serve")?;
    Ok(())
}
