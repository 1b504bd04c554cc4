//! Session commands.
//!
//! The server keeps the Google session in an encrypted cookie. Signing in
//! happens in a browser; the cookie value is then handed to the CLI with
//! `study auth set-session` and stored in the config file.

use clap::{Args, Subcommand};

use super::Context;
use crate::api::ApiError;
use crate::config::{write_session, Config, ConfigSource};

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Show how to sign in with Google
    Login,
    /// Store the session cookie value copied from the browser
    SetSession {
        /// Value of the google_tokens cookie
        value: String,
    },
    /// End the session and remove it from the config
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Login => {
                println!("Open this URL in a browser and sign in with Google:");
                println!();
                println!("  {}", ctx.api().login_url());
                println!();
                println!("Then copy the value of the 'google_tokens' cookie for that site and run:");
                println!();
                println!("  study auth set-session <value>");
                Ok(())
            }
            AuthSubcommand::SetSession { value } => {
                let path = ctx.config.writable_path();
                write_session(&path, Some(value.trim()))?;
                println!("Session saved to {}", path.display());
                Ok(())
            }
            AuthSubcommand::Logout => logout(ctx).await,
            AuthSubcommand::Status => status(ctx).await,
        }
    }
}

async fn logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.config.session.value.is_none() {
        println!("Already logged out.");
        return Ok(());
    }

    // The cookie is dropped locally either way.
    if let Err(e) = ctx.api().logout().await {
        tracing::debug!("Server logout failed: {}", e);
    }

    let path = ctx.config.writable_path();
    if path.exists() {
        write_session(&path, None)?;
    }
    println!("Logged out.");
    Ok(())
}

async fn status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.config.session.value.is_none() {
        println!("Not logged in. Run 'study auth login' to authenticate.");
        return Ok(());
    }

    match ctx.api().user().await {
        Ok(user) if user.authenticated => {
            let name = user.display_name().unwrap_or_else(|| "unknown user".to_string());
            println!("Logged in as {} ({})", name, ctx.config.server_url.value);
        }
        Ok(_) | Err(ApiError::NotLoggedIn) => {
            println!("Session expired. Run 'study auth login' to sign in again.");
        }
        Err(e) => {
            println!("Session stored, but the server could not be reached: {}", e);
        }
    }
    if ctx.config.session.source == ConfigSource::Environment {
        println!("(session from STUDY_SESSION)");
    } else if let Some(path) = &ctx.config.config_file {
        println!("(session from {})", path.display());
    } else {
        println!("(session from {})", Config::default_config_path().display());
    }
    Ok(())
}
