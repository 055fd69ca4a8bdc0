//! TA/DA Claims - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tada-api
//!
//! TADA_SERVER__PORT=9090 TADA_DATABASE__URL=postgres://... cargo run --bin tada-api
//! ```
//!
//! # Environment Variables
//!
//! * `TADA_SERVER__HOST` / `TADA_SERVER__PORT` - Listen address (default: 0.0.0.0:8080)
//! * `TADA_DATABASE__URL` - PostgreSQL connection string
//! * `TADA_AUTH__JWT_SECRET` - JWT signing secret (required in production)
//! * `TADA_RATES__DAILY_RATE`, `TADA_RATES__PER_KM__<MODE>` - Allowance rates
//! * `TADA_LOG_LEVEL` - Default log filter; `RUST_LOG` takes precedence

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_travel::adapters::TracingNotifier;
use domain_travel::ClaimService;
use infra_db::{create_pool, run_migrations, PostgresClaimRepository, PostgresReceiptStore};
use interface_api::{config::ApiConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::load().context("loading configuration")?;
    init_tracing(&config.log_level);

    let engine = config.engine().context("building claim engine")?;
    tracing::info!(
        addr = %config.server_addr(),
        currency = %engine.rates().currency(),
        daily_rate = %engine.rates().daily_rate,
        "Starting TA/DA claims API server"
    );

    let pool = create_pool(config.database_config())
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("running migrations")?;

    let service = ClaimService::new(
        engine,
        Arc::new(PostgresClaimRepository::new(pool.clone())),
        Arc::new(TracingNotifier),
        Arc::new(PostgresReceiptStore::new(pool)),
    );

    let addr: SocketAddr = config.server_addr().parse().context("parsing listen address")?;
    let app = create_router(service, config);

    tracing::info!(%addr, "Server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
