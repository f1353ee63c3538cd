//! Profile management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use portal_core::error::AppError;
use portal_entity::profile::{CreateProfile, QuotaMode};

/// Arguments for profile commands
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Profile subcommand
    #[command(subcommand)]
    pub command: ProfileCommand,
}

/// Profile subcommands
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List all profiles
    List,
    /// Create a new profile
    Create {
        /// Unique profile name (also the AAA group name)
        name: String,
        /// Upload rate cap, e.g. 512k or 2M
        #[arg(long)]
        upload_rate: Option<String>,
        /// Download rate cap, e.g. 2M or 10M
        #[arg(long)]
        download_rate: Option<String>,
        /// Daily byte limit
        #[arg(long)]
        daily_limit: Option<i64>,
        /// Weekly byte limit
        #[arg(long)]
        weekly_limit: Option<i64>,
        /// Monthly byte limit
        #[arg(long)]
        monthly_limit: Option<i64>,
        /// Account validity in seconds
        #[arg(long)]
        validity_seconds: Option<i64>,
        /// AAA Session-Timeout in seconds
        #[arg(long)]
        session_timeout: Option<i64>,
        /// AAA Idle-Timeout in seconds
        #[arg(long)]
        idle_timeout: Option<i64>,
        /// Maximum simultaneous sessions
        #[arg(long)]
        max_sessions: Option<i32>,
    },
    /// Re-enable a profile for resolution
    Enable {
        /// Profile name
        name: String,
    },
    /// Soft-disable a profile (drops out of resolution)
    Disable {
        /// Profile name
        name: String,
    },
}

/// Execute profile commands
pub async fn execute(
    args: &ProfileArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let services = super::build_services(pool, &config)?;

    match &args.command {
        ProfileCommand::List => {
            let profiles = services.profile_repo.find_all().await?;
            output::print_list(&profiles, format);
        }
        ProfileCommand::Create {
            name,
            upload_rate,
            download_rate,
            daily_limit,
            weekly_limit,
            monthly_limit,
            validity_seconds,
            session_timeout,
            idle_timeout,
            max_sessions,
        } => {
            let quota_mode =
                if daily_limit.is_some() || weekly_limit.is_some() || monthly_limit.is_some() {
                    QuotaMode::Limited
                } else {
                    QuotaMode::Unlimited
                };

            let profile = services
                .profile_repo
                .create(&CreateProfile {
                    name: name.clone(),
                    upload_rate: upload_rate.clone(),
                    download_rate: download_rate.clone(),
                    quota_mode,
                    daily_limit: *daily_limit,
                    weekly_limit: *weekly_limit,
                    monthly_limit: *monthly_limit,
                    validity_seconds: *validity_seconds,
                    session_timeout_seconds: *session_timeout,
                    idle_timeout_seconds: *idle_timeout,
                    max_sessions: *max_sessions,
                })
                .await?;
            output::print_success(&format!("Profile '{}' created", profile.name));
            output::print_item(&profile, format);
        }
        ProfileCommand::Enable { name } => {
            let profile = find_profile(&services, name).await?;
            services.profile_repo.set_active(profile.id, true).await?;
            output::print_success(&format!("Profile '{}' enabled", name));
        }
        ProfileCommand::Disable { name } => {
            let profile = find_profile(&services, name).await?;
            services.profile_repo.set_active(profile.id, false).await?;
            output::print_success(&format!("Profile '{}' disabled", name));
        }
    }

    Ok(())
}

/// Resolve a profile name to its row.
async fn find_profile(
    services: &super::Services,
    name: &str,
) -> Result<portal_entity::profile::Profile, AppError> {
    services
        .profile_repo
        .find_by_name(name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Profile '{}' not found", name)))
}
