//! Alert evaluation CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use portal_core::error::AppError;
use portal_core::types::QuotaWindow;
use portal_entity::alert::AlertChannel;

/// Arguments for alert commands
#[derive(Debug, Args)]
pub struct AlertsArgs {
    /// Alert subcommand
    #[command(subcommand)]
    pub command: AlertsCommand,
}

/// Alert subcommands
#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Run one alert sweep now
    Check,
    /// Add a threshold rule to a profile
    AddRule {
        /// Profile name
        profile: String,
        /// Window the threshold applies to (daily, weekly, monthly)
        window: QuotaWindow,
        /// Percentage of the limit that triggers the alert (1-100)
        threshold: i16,
        /// Delivery channel (log, webhook)
        #[arg(long, default_value = "log")]
        channel: AlertChannel,
        /// Message template; supports {username}, {threshold}, {percent},
        /// {used}, {limit}, {remaining}
        #[arg(
            long,
            default_value = "{username} has used {percent}% of the {limit} byte limit"
        )]
        template: String,
    },
}

/// Execute alert commands
pub async fn execute(args: &AlertsArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let services = super::build_services(pool, &config)?;

    match &args.command {
        AlertsCommand::Check => {
            let triggered = services.alerts.check_alerts().await?;
            if triggered.is_empty() {
                output::print_success("No alerts triggered");
            } else {
                output::print_list(&triggered, format);
            }
        }
        AlertsCommand::AddRule {
            profile,
            window,
            threshold,
            channel,
            template,
        } => {
            if !(1..=100).contains(threshold) {
                return Err(AppError::validation(format!(
                    "Threshold must be between 1 and 100, got {threshold}"
                )));
            }
            let profile = services
                .profile_repo
                .find_by_name(profile)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Profile '{}' not found", profile)))?;
            let rule = services
                .alert_repo
                .create_rule(profile.id, *window, *threshold, *channel, template)
                .await?;
            output::print_success(&format!(
                "Rule added: {}% of {} limit on '{}'",
                rule.threshold_percent, rule.window, profile.name
            ));
        }
    }

    Ok(())
}
