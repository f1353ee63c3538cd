//! Quota ledger CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use portal_core::error::AppError;
use portal_core::types::QuotaWindow;
use portal_entity::usage::AccountingUpdate;

/// Arguments for quota commands
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Quota subcommand
    #[command(subcommand)]
    pub command: QuotaCommand,
}

/// Quota subcommands
#[derive(Debug, Subcommand)]
pub enum QuotaCommand {
    /// Show a user's usage across all windows
    Show {
        /// Username
        username: String,
    },
    /// Ingest one accounting record for a user
    Ingest {
        /// Username
        username: String,
        /// Input octets (lower 32 bits)
        #[arg(long, default_value_t = 0)]
        input_octets: u32,
        /// Output octets (lower 32 bits)
        #[arg(long, default_value_t = 0)]
        output_octets: u32,
        /// Input gigaword counter (upper 32 bits)
        #[arg(long, default_value_t = 0)]
        input_gigawords: u32,
        /// Output gigaword counter (upper 32 bits)
        #[arg(long, default_value_t = 0)]
        output_gigawords: u32,
    },
    /// Check whether a user is over one window's limit
    Check {
        /// Username
        username: String,
        /// Window to check (daily, weekly, monthly)
        window: QuotaWindow,
    },
    /// Reset one window across all active ledgers
    Reset {
        /// Window to reset (daily, weekly, monthly)
        window: QuotaWindow,
    },
    /// List users over any window limit
    Exceeded,
}

/// Execute quota commands
pub async fn execute(args: &QuotaArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let services = super::build_services(pool, &config)?;

    match &args.command {
        QuotaCommand::Show { username } => {
            let user = services
                .user_repo
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))?;
            let snapshot = services.quota.current_usage(user.id).await?;
            output::print_item(&snapshot, format);
        }
        QuotaCommand::Ingest {
            username,
            input_octets,
            output_octets,
            input_gigawords,
            output_gigawords,
        } => {
            let update = AccountingUpdate {
                input_octets: *input_octets,
                output_octets: *output_octets,
                input_gigawords: *input_gigawords,
                output_gigawords: *output_gigawords,
                recorded_at: Utc::now(),
            };
            let snapshot = services.quota.record_usage(username, &update).await?;
            output::print_success(&format!(
                "Recorded {} bytes for '{}'",
                update.total_bytes(),
                username
            ));
            output::print_item(&snapshot, format);
        }
        QuotaCommand::Check { username, window } => {
            let user = services
                .user_repo
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))?;
            let exceeded = services.quota.is_exceeded(user.id, *window).await?;
            if exceeded {
                output::print_warning(&format!("'{}' is over the {} limit", username, window));
            } else {
                output::print_success(&format!("'{}' is within the {} limit", username, window));
            }
        }
        QuotaCommand::Reset { window } => {
            let rows = services.quota.reset_window(*window).await?;
            output::print_success(&format!("Reset {} window on {} ledgers", window, rows));
        }
        QuotaCommand::Exceeded => {
            let exceeded = services.quota.exceeded_users().await?;
            output::print_list(&exceeded, format);
        }
    }

    Ok(())
}
