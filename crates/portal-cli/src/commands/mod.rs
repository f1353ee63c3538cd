//! CLI command definitions and dispatch.

pub mod alerts;
pub mod migrate;
pub mod profile;
pub mod promotion;
pub mod quota;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::repositories::alert::AlertRepository;
use portal_database::repositories::history::HistoryRepository;
use portal_database::repositories::profile::ProfileRepository;
use portal_database::repositories::promotion::PromotionRepository;
use portal_database::repositories::radius::RadiusRepository;
use portal_database::repositories::usage::UsageRepository;
use portal_database::repositories::user::UserRepository;
use portal_service::alerts::{AlertEvaluator, ChannelNotifier};
use portal_service::directory::DirectoryService;
use portal_service::history::HistoryRecorder;
use portal_service::provisioning::ProvisioningService;
use portal_service::quota::QuotaService;
use portal_service::resolver::ProfileResolver;

/// NetGate — captive portal access control plane
#[derive(Debug, Parser)]
#[command(name = "portal", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (overlay file under config/)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User access management
    User(user::UserArgs),
    /// Profile management
    Profile(profile::ProfileArgs),
    /// Promotion (cohort) management
    Promotion(promotion::PromotionArgs),
    /// Quota ledger management
    Quota(quota::QuotaArgs),
    /// Alert rule evaluation
    Alerts(alerts::AlertsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::User(args) => user::execute(args, &self.env, self.format).await,
            Commands::Profile(args) => profile::execute(args, &self.env, self.format).await,
            Commands::Promotion(args) => promotion::execute(args, &self.env, self.format).await,
            Commands::Quota(args) => quota::execute(args, &self.env, self.format).await,
            Commands::Alerts(args) => alerts::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, AppError> {
    let pool = portal_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

/// The full service graph, assembled once per invocation.
pub struct Services {
    pub user_repo: Arc<UserRepository>,
    pub profile_repo: Arc<ProfileRepository>,
    pub promotion_repo: Arc<PromotionRepository>,
    pub usage_repo: Arc<UsageRepository>,
    pub alert_repo: Arc<AlertRepository>,
    pub resolver: Arc<ProfileResolver>,
    pub recorder: Arc<HistoryRecorder>,
    pub directory: Arc<DirectoryService>,
    pub provisioning: Arc<ProvisioningService>,
    pub quota: Arc<QuotaService>,
    pub alerts: Arc<AlertEvaluator>,
}

/// Helper: wire repositories and services onto a pool
pub fn build_services(pool: sqlx::PgPool, config: &AppConfig) -> Result<Services, AppError> {
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let profile_repo = Arc::new(ProfileRepository::new(pool.clone()));
    let promotion_repo = Arc::new(PromotionRepository::new(pool.clone()));
    let radius_repo = Arc::new(RadiusRepository::new(pool.clone()));
    let usage_repo = Arc::new(UsageRepository::new(pool.clone()));
    let history_repo = Arc::new(HistoryRepository::new(pool.clone()));
    let alert_repo = Arc::new(AlertRepository::new(pool.clone()));

    let resolver = Arc::new(ProfileResolver::new(
        Arc::clone(&profile_repo),
        Arc::clone(&promotion_repo),
    ));
    let recorder = Arc::new(HistoryRecorder::new(history_repo));

    let directory = Arc::new(DirectoryService::new(
        Arc::clone(&user_repo),
        Arc::clone(&profile_repo),
        Arc::clone(&promotion_repo),
        Arc::clone(&usage_repo),
        Arc::clone(&resolver),
        Arc::clone(&recorder),
    ));

    let provisioning = Arc::new(ProvisioningService::new(
        pool,
        Arc::clone(&user_repo),
        Arc::clone(&promotion_repo),
        radius_repo,
        Arc::clone(&resolver),
        config.provisioning.clone(),
    ));

    let quota = Arc::new(QuotaService::new(
        Arc::clone(&usage_repo),
        Arc::clone(&user_repo),
        Arc::clone(&resolver),
    ));

    let notifier = Arc::new(ChannelNotifier::new(&config.alerts)?);
    let alerts = Arc::new(AlertEvaluator::new(
        Arc::clone(&alert_repo),
        Arc::clone(&usage_repo),
        Arc::clone(&resolver),
        notifier,
        config.alerts.enabled,
    ));

    Ok(Services {
        user_repo,
        profile_repo,
        promotion_repo,
        alert_repo,
        usage_repo,
        resolver,
        recorder,
        directory,
        provisioning,
        quota,
        alerts,
    })
}
