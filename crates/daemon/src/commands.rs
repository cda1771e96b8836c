//! CLI commands

use crate::config::Settings;
use crate::{server, session};
use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use starlight_core::Envelope;
use starlight_http::AuthGateway;
use starlight_http::types::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, SelectCustomerRequest,
    SelectTenantRequest, UpdateProfileRequest,
};
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the proxy server
    Serve,

    /// Sign in
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "STARLIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STARLIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Choose the customer account to act for
    SelectCustomer {
        #[arg(short, long)]
        username: String,

        customer_id: i64,
    },

    /// Choose the tenant to act for
    SelectTenant {
        #[arg(short, long)]
        username: String,

        tenant_id: i64,
    },

    /// Show the stored session
    Whoami,

    /// Fetch the profile from the backend
    Profile,

    /// Change profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Change the password
    ResetPassword {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,

        #[arg(long)]
        confirm: String,
    },

    /// Sign out here and on the backend
    Logout,
}

impl Commands {
    pub async fn execute(self, settings: Settings) -> Result<ExitCode> {
        if let Commands::Serve = self {
            server::serve(&settings).await?;
            return Ok(ExitCode::SUCCESS);
        }

        let gateway = session::open(&settings)?;
        let code = self.run_client(&gateway).await?;
        session::save(&gateway)?;
        Ok(code)
    }

    async fn run_client(self, gateway: &AuthGateway) -> Result<ExitCode> {
        match self {
            Commands::Serve => Ok(ExitCode::SUCCESS),
            Commands::Login { username, password } => {
                info!(%username, "Signing in");
                print_envelope(&gateway.login(&LoginRequest { username, password }).await)
            }
            Commands::Register {
                username,
                email,
                password,
            } => print_envelope(
                &gateway
                    .register(&RegisterRequest {
                        username,
                        password,
                        email,
                    })
                    .await,
            ),
            Commands::SelectCustomer {
                username,
                customer_id,
            } => print_envelope(
                &gateway
                    .select_customer(&SelectCustomerRequest {
                        username,
                        customer_id,
                    })
                    .await,
            ),
            Commands::SelectTenant {
                username,
                tenant_id,
            } => print_envelope(
                &gateway
                    .select_tenant(&SelectTenantRequest {
                        username,
                        tenant_id,
                    })
                    .await,
            ),
            Commands::Whoami => {
                let session = gateway.store().snapshot();
                println!("{}", serde_json::to_string_pretty(&session)?);
                Ok(if session.is_authenticated {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Commands::Profile => print_envelope(&gateway.get_profile().await),
            Commands::UpdateProfile { name, email, phone } => print_envelope(
                &gateway
                    .update_profile(&UpdateProfileRequest { name, email, phone })
                    .await,
            ),
            Commands::ResetPassword {
                current,
                new,
                confirm,
            } => print_envelope(
                &gateway
                    .reset_password(&ResetPasswordRequest {
                        current_password: current,
                        new_password: new,
                        confirm_password: confirm,
                    })
                    .await,
            ),
            Commands::Logout => print_envelope(&gateway.logout().await),
        }
    }
}

/// Print the envelope as JSON; a failed envelope is a failed exit
fn print_envelope<T: Serialize>(envelope: &Envelope<T>) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(if envelope.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
