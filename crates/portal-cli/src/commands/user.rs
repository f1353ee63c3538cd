//! User access management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use portal_core::error::AppError;
use portal_core::types::pagination::PageRequest;

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Provision a user into the AAA store and allow access
    Activate {
        /// Username
        username: String,
    },
    /// Remove a user's AAA entries and block access
    Deactivate {
        /// Username
        username: String,
    },
    /// Show a user's access state, effective profile, and AAA entries
    Show {
        /// Username
        username: String,
    },
    /// Assign an individual profile override
    AssignProfile {
        /// Username
        username: String,
        /// Profile name
        profile: String,
    },
    /// Clear the individual profile override
    ClearProfile {
        /// Username
        username: String,
    },
    /// List users currently enabled for network access
    List,
    /// Update a user's AAA credential mirror
    SetPassword {
        /// Username
        username: String,
    },
    /// Show a user's profile-change history
    History {
        /// Username
        username: String,
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let services = super::build_services(pool, &config)?;

    match &args.command {
        UserCommand::Activate { username } => {
            let user = find_user(&services, username).await?;
            services.provisioning.activate_user(user.id).await?;
            output::print_success(&format!("User '{}' activated", username));
        }
        UserCommand::Deactivate { username } => {
            let user = find_user(&services, username).await?;
            services.provisioning.deactivate_user(user.id).await?;
            output::print_success(&format!("User '{}' deactivated", username));
        }
        UserCommand::Show { username } => {
            let user = find_user(&services, username).await?;
            let profile = services.resolver.resolve_for(&user).await?;
            let entries = services.provisioning.entry_set_for(&user).await?;

            output::print_kv("username", &user.username);
            output::print_kv("access", &format!("{:?}", user.access_state()));
            output::print_kv(
                "effective profile",
                profile.as_ref().map(|p| p.name.as_str()).unwrap_or("default"),
            );
            match entries {
                Some(mut set) => {
                    // Never show the credential mirror.
                    for check in &mut set.checks {
                        if check.attribute == portal_entity::radius::ATTR_CLEARTEXT_PASSWORD {
                            check.value = "<redacted>".to_string();
                        }
                    }
                    output::print_item(&set, format);
                }
                None => println!("  (no AAA entries)"),
            }
        }
        UserCommand::AssignProfile { username, profile } => {
            let user = find_user(&services, username).await?;
            let profile = services
                .profile_repo
                .find_by_name(profile)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Profile '{}' not found", profile)))?;
            services.directory.assign_profile(user.id, profile.id).await?;
            output::print_success(&format!(
                "Profile '{}' assigned to '{}'",
                profile.name, username
            ));
        }
        UserCommand::ClearProfile { username } => {
            let user = find_user(&services, username).await?;
            services.directory.clear_profile(user.id).await?;
            output::print_success(&format!("Profile override cleared for '{}'", username));
        }
        UserCommand::List => {
            let users = services.user_repo.find_enabled().await?;
            let rows: Vec<portal_entity::user::MemberAccess> =
                users.iter().map(portal_entity::user::MemberAccess::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::SetPassword { username } => {
            let user = find_user(&services, username).await?;
            let password = dialoguer::Password::new()
                .with_prompt(format!("New password for '{}'", username))
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(|e| AppError::internal(format!("Prompt failed: {}", e)))?;
            services.user_repo.set_credential_mirror(user.id, &password).await?;
            output::print_success(&format!(
                "Credential updated for '{}'; re-activate to push it to the AAA store",
                username
            ));
        }
        UserCommand::History { username, page } => {
            let user = find_user(&services, username).await?;
            let request = PageRequest::new(*page, PageRequest::default().page_size);
            let history = services.recorder.history_for(user.id, &request).await?;
            output::print_list(&history.items, format);
        }
    }

    Ok(())
}

/// Resolve a username to its directory row.
async fn find_user(
    services: &super::Services,
    username: &str,
) -> Result<portal_entity::user::User, AppError> {
    services
        .user_repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))
}
