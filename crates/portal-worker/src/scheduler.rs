//! Cron scheduler for periodic control-plane tasks.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;
use uuid::Uuid;

use portal_core::config::worker::WorkerConfig;
use portal_core::error::AppError;
use portal_core::types::QuotaWindow;
use portal_service::alerts::AlertEvaluator;
use portal_service::provisioning::ProvisioningService;
use portal_service::quota::QuotaService;

/// Cron-based scheduler for periodic control-plane tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Quota service for window resets and exceeded queries
    quota: Arc<QuotaService>,
    /// Alert evaluator for threshold sweeps
    alerts: Arc<AlertEvaluator>,
    /// Provisioning service for enforcement deactivations
    provisioning: Arc<ProvisioningService>,
    /// Cron expressions per task
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(
        quota: Arc<QuotaService>,
        alerts: Arc<AlertEvaluator>,
        provisioning: Arc<ProvisioningService>,
        config: WorkerConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            quota,
            alerts,
            provisioning,
            config,
        })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_window_reset(QuotaWindow::Daily, &self.config.daily_reset_cron)
            .await?;
        self.register_window_reset(QuotaWindow::Weekly, &self.config.weekly_reset_cron)
            .await?;
        self.register_window_reset(QuotaWindow::Monthly, &self.config.monthly_reset_cron)
            .await?;
        self.register_alert_sweep().await?;
        self.register_enforcement_sweep().await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Window reset at its boundary
    async fn register_window_reset(
        &self,
        window: QuotaWindow,
        cron: &str,
    ) -> Result<(), AppError> {
        let quota = Arc::clone(&self.quota);
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let quota = Arc::clone(&quota);
            Box::pin(async move {
                tracing::debug!(window = %window, "Running quota window reset");
                if let Err(e) = quota.reset_window(window).await {
                    tracing::error!(window = %window, "Window reset failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create {window} reset schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {window} reset schedule: {}", e))
        })?;

        tracing::info!("Registered: {window} window reset ({cron})");
        Ok(())
    }

    /// Alert threshold sweep
    async fn register_alert_sweep(&self) -> Result<(), AppError> {
        let alerts = Arc::clone(&self.alerts);
        let job = CronJob::new_async(
            self.config.alert_sweep_cron.as_str(),
            move |_uuid, _lock| {
                let alerts = Arc::clone(&alerts);
                Box::pin(async move {
                    tracing::debug!("Running alert sweep");
                    if let Err(e) = alerts.check_alerts().await {
                        tracing::error!("Alert sweep failed: {}", e);
                    }
                })
            },
        )
        .map_err(|e| AppError::internal(format!("Failed to create alert_sweep schedule: {}", e)))?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add alert_sweep schedule: {}", e))
        })?;

        tracing::info!(
            "Registered: alert_sweep ({})",
            self.config.alert_sweep_cron
        );
        Ok(())
    }

    /// Enforcement sweep: deprovision users over any window limit
    async fn register_enforcement_sweep(&self) -> Result<(), AppError> {
        let quota = Arc::clone(&self.quota);
        let provisioning = Arc::clone(&self.provisioning);
        let job = CronJob::new_async(
            self.config.enforcement_sweep_cron.as_str(),
            move |_uuid, _lock| {
                let quota = Arc::clone(&quota);
                let provisioning = Arc::clone(&provisioning);
                Box::pin(async move {
                    tracing::debug!("Running enforcement sweep");
                    if let Err(e) = run_enforcement_sweep(&quota, &provisioning).await {
                        tracing::error!("Enforcement sweep failed: {}", e);
                    }
                })
            },
        )
        .map_err(|e| {
            AppError::internal(format!("Failed to create enforcement_sweep schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add enforcement_sweep schedule: {}", e))
        })?;

        tracing::info!(
            "Registered: enforcement_sweep ({})",
            self.config.enforcement_sweep_cron
        );
        Ok(())
    }
}

/// One enforcement pass: deactivate every user over any window limit.
///
/// A user over several windows at once is deactivated once. Individual
/// failures are logged and do not stop the pass.
async fn run_enforcement_sweep(
    quota: &QuotaService,
    provisioning: &ProvisioningService,
) -> Result<(), AppError> {
    let exceeded = quota.exceeded_users().await?;
    if exceeded.is_empty() {
        return Ok(());
    }

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut deactivated = 0usize;

    for entry in &exceeded {
        if !seen.insert(entry.user_id) {
            continue;
        }

        tracing::warn!(
            username = %entry.username,
            window = %entry.window,
            used = entry.used,
            limit = entry.limit,
            "Quota exceeded; deactivating"
        );

        match provisioning.deactivate_user(entry.user_id).await {
            Ok(()) => deactivated += 1,
            Err(e) => {
                tracing::error!(
                    username = %entry.username,
                    error = %e,
                    "Enforcement deactivation failed"
                );
            }
        }
    }

    tracing::info!(
        exceeded = exceeded.len(),
        deactivated = deactivated,
        "Enforcement sweep completed"
    );
    Ok(())
}
