//! Promotion (cohort) management CLI commands.

use clap::{Args, Subcommand};
use dialoguer::Confirm;

use crate::output::{self, OutputFormat};
use portal_core::error::AppError;
use portal_core::types::pagination::PageRequest;
use portal_entity::promotion::Promotion;

/// Arguments for promotion commands
#[derive(Debug, Args)]
pub struct PromotionArgs {
    /// Promotion subcommand
    #[command(subcommand)]
    pub command: PromotionCommand,
}

/// Promotion subcommands
#[derive(Debug, Subcommand)]
pub enum PromotionCommand {
    /// Create a new promotion
    Create {
        /// Unique short code (e.g. X2027)
        code: String,
        /// Human-readable name
        name: String,
        /// Cohort profile name
        #[arg(long)]
        profile: Option<String>,
    },
    /// Activate every member of a promotion
    Activate {
        /// Promotion code
        code: String,
    },
    /// Deactivate every member of a promotion
    Deactivate {
        /// Promotion code
        code: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List members and their access states
    Members {
        /// Promotion code
        code: String,
        /// Page number (1-based); omit to list everyone
        #[arg(short, long)]
        page: Option<u64>,
    },
    /// Flip the promotion's active flag
    Toggle {
        /// Promotion code
        code: String,
    },
    /// Point the promotion at a profile (omit to clear)
    SetProfile {
        /// Promotion code
        code: String,
        /// Profile name
        profile: Option<String>,
    },
}

/// Execute promotion commands
pub async fn execute(
    args: &PromotionArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let services = super::build_services(pool, &config)?;

    match &args.command {
        PromotionCommand::Create { code, name, profile } => {
            let profile_id = match profile {
                Some(profile_name) => Some(
                    services
                        .profile_repo
                        .find_by_name(profile_name)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!("Profile '{}' not found", profile_name))
                        })?
                        .id,
                ),
                None => None,
            };
            let promotion = services
                .promotion_repo
                .create(&portal_entity::promotion::CreatePromotion {
                    code: code.clone(),
                    name: name.clone(),
                    profile_id,
                })
                .await?;
            output::print_success(&format!("Promotion '{}' created", promotion.code));
            output::print_item(&promotion, format);
        }
        PromotionCommand::Activate { code } => {
            let promotion = find_promotion(&services, code).await?;
            let report = services.provisioning.activate_promotion(promotion.id).await?;
            output::print_item(&report, format);
            if report.has_failures() {
                output::print_warning(&format!(
                    "{} of {} members failed",
                    report.failed, report.requested
                ));
            } else {
                output::print_success(&format!("Promotion '{}' activated", code));
            }
        }
        PromotionCommand::Deactivate { code, yes } => {
            let promotion = find_promotion(&services, code).await?;
            let members = services.promotion_repo.members(promotion.id).await?;

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Deactivate all {} members of '{}'?",
                        members.len(),
                        code
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {}", e)))?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let report = services.provisioning.deactivate_promotion(promotion.id).await?;
            output::print_item(&report, format);
            if report.has_failures() {
                output::print_warning(&format!(
                    "{} of {} members failed",
                    report.failed, report.requested
                ));
            } else {
                output::print_success(&format!("Promotion '{}' deactivated", code));
            }
        }
        PromotionCommand::Members { code, page } => {
            let promotion = find_promotion(&services, code).await?;
            match page {
                Some(page) => {
                    let request = PageRequest::new(*page, PageRequest::default().page_size);
                    let members = services
                        .directory
                        .members_page(promotion.id, &request)
                        .await?;
                    output::print_list(&members.items, format);
                    println!(
                        "  page {} of {} ({} members)",
                        members.page,
                        members.total_pages(),
                        members.total_items
                    );
                }
                None => {
                    let members = services.directory.members(promotion.id).await?;
                    output::print_list(&members, format);
                }
            }
        }
        PromotionCommand::Toggle { code } => {
            let promotion = find_promotion(&services, code).await?;
            let active = services.directory.toggle_promotion(promotion.id).await?;
            output::print_success(&format!(
                "Promotion '{}' is now {}",
                code,
                if active { "active" } else { "inactive" }
            ));
        }
        PromotionCommand::SetProfile { code, profile } => {
            let promotion = find_promotion(&services, code).await?;
            let profile_id = match profile {
                Some(name) => Some(
                    services
                        .profile_repo
                        .find_by_name(name)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!("Profile '{}' not found", name))
                        })?
                        .id,
                ),
                None => None,
            };
            services
                .directory
                .set_promotion_profile(promotion.id, profile_id)
                .await?;
            match profile {
                Some(name) => output::print_success(&format!(
                    "Promotion '{}' now uses profile '{}'",
                    code, name
                )),
                None => output::print_success(&format!("Promotion '{}' profile cleared", code)),
            }
        }
    }

    Ok(())
}

/// Resolve a promotion code to its row.
async fn find_promotion(services: &super::Services, code: &str) -> Result<Promotion, AppError> {
    services
        .promotion_repo
        .find_by_code(code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Promotion '{}' not found", code)))
}
