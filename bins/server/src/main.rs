//! Gophermart API Server
//!
//! Runs the HTTP API and the accrual reconciliation worker side by side.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gophermart_api::{AppState, create_router};
use gophermart_core::accrual::HttpAccrualClient;
use gophermart_core::reconcile::ReconciliationWorker;
use gophermart_db::migration::Migrator;
use gophermart_db::{ReconcileRepository, connect};
use gophermart_shared::config::{LogConfig, LogFormat};
use gophermart_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();
    let config =
        AppConfig::load(&args.into_overrides()).context("Failed to load configuration")?;

    init_tracing(&config.log);

    if config.jwt.uses_default_secret() {
        warn!("Using the built-in JWT secret; set GOPHERMART__JWT__SECRET in production");
    }

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    let shutdown = CancellationToken::new();

    let accrual_client =
        HttpAccrualClient::new(&config.accrual).context("Failed to build accrual client")?;
    info!(accrual = %accrual_client.base_url(), "Accrual client configured");

    let worker = ReconciliationWorker::new(
        ReconcileRepository::new(db.clone()),
        accrual_client,
        config.worker.clone(),
    );
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let state = AppState {
        db: Arc::new(db.clone()),
        jwt_service: Arc::new(JwtService::new(&config.jwt)),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address))?;
    info!(address = %config.server.address, "Server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    // The server may also stop on its own error; the worker follows either way.
    shutdown.cancel();
    match tokio::time::timeout(config.worker.shutdown_grace(), worker_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Reconciliation worker {}", join_failure(&e)),
        Err(_) => warn!(
            grace = ?config.worker.shutdown_grace(),
            "Reconciliation worker did not stop in time"
        ),
    }

    if let Err(e) = db.close().await {
        warn!(error = %e, "Failed to close database pool");
    }

    served.context("Server error")?;
    info!("Shutdown complete");
    Ok(())
}

/// Describes why the worker task ended without returning.
fn join_failure(err: &JoinError) -> &'static str {
    if err.is_panic() {
        "panicked"
    } else if err.is_cancelled() {
        "was cancelled"
    } else {
        "failed"
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM and cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
        () = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
