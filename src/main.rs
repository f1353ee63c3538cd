//! NetGate Portal Server — captive portal access control plane
//!
//! Main entry point that wires all crates together, runs migrations,
//! and keeps the scheduled control-plane tasks running.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use portal_core::config::AppConfig;
use portal_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PORTAL_ENV").unwrap_or_else(|_| "default".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NetGate portal v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = portal_database::connection::DatabasePool::connect(&config.database).await?;
    db.health_check().await?;
    let pool = db.into_pool();

    portal_database::migration::run_migrations(&pool).await?;

    // ── Step 2: Initialize repositories ──────────────────────────
    let user_repo = Arc::new(portal_database::repositories::user::UserRepository::new(
        pool.clone(),
    ));
    let profile_repo = Arc::new(
        portal_database::repositories::profile::ProfileRepository::new(pool.clone()),
    );
    let promotion_repo = Arc::new(
        portal_database::repositories::promotion::PromotionRepository::new(pool.clone()),
    );
    let radius_repo = Arc::new(
        portal_database::repositories::radius::RadiusRepository::new(pool.clone()),
    );
    let usage_repo = Arc::new(portal_database::repositories::usage::UsageRepository::new(
        pool.clone(),
    ));
    let alert_repo = Arc::new(portal_database::repositories::alert::AlertRepository::new(
        pool.clone(),
    ));

    // ── Step 3: Initialize services ──────────────────────────────
    tracing::info!("Initializing services...");
    let resolver = Arc::new(portal_service::resolver::ProfileResolver::new(
        Arc::clone(&profile_repo),
        Arc::clone(&promotion_repo),
    ));
    let provisioning = Arc::new(portal_service::provisioning::ProvisioningService::new(
        pool.clone(),
        Arc::clone(&user_repo),
        Arc::clone(&promotion_repo),
        Arc::clone(&radius_repo),
        Arc::clone(&resolver),
        config.provisioning.clone(),
    ));
    let quota = Arc::new(portal_service::quota::QuotaService::new(
        Arc::clone(&usage_repo),
        Arc::clone(&user_repo),
        Arc::clone(&resolver),
    ));

    let notifier = Arc::new(portal_service::alerts::ChannelNotifier::new(&config.alerts)?);
    let alerts = Arc::new(portal_service::alerts::AlertEvaluator::new(
        Arc::clone(&alert_repo),
        Arc::clone(&usage_repo),
        Arc::clone(&resolver),
        notifier,
        config.alerts.enabled,
    ));
    tracing::info!("Services initialized");

    // ── Step 4: Start scheduler ──────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = portal_worker::scheduler::CronScheduler::new(
            Arc::clone(&quota),
            Arc::clone(&alerts),
            Arc::clone(&provisioning),
            config.worker.clone(),
        )
        .await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduler disabled");
        None
    };

    tracing::info!("NetGate portal running");

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    pool.close().await;

    tracing::info!("NetGate portal shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
