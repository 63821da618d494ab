//! Backend entry-point: loads settings, prepares persistence and starts the
//! HTTP server.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use foodgram::inbound::http::health::HealthState;
use foodgram::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{BuildMode, ServerConfig, ServerSettings, create_server, key_fingerprint};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = ServerConfig::from_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(config.key()),
        "session signing key loaded"
    );

    let config = match settings.database_url.as_deref() {
        Some(database_url) => {
            if settings.run_migrations {
                run_pending_migrations(database_url)
                    .await
                    .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
                info!("database migrations applied");
            }
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(settings.pool_size()),
            )
            .await
            .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            config.with_db_pool(pool)
        }
        None => config,
    };

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
