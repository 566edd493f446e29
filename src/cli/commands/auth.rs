use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{authenticated_client, clear_session, save_session, CliSession};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "API base URL (defaults to ACADEMY_API_URL)")]
        url: Option<String>,
    },

    #[command(about = "Show the current session as seen by the server")]
    Whoami,

    #[command(about = "Forget the stored session")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, name, url } => {
            let mut client_config = config().client.clone();
            if let Some(url) = url {
                client_config.base_url = url;
            }

            let api = ApiClient::new(&client_config)?;
            let response = api
                .sign_in(&email, name.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            let saved = CliSession::new(&client_config.base_url, response);
            save_session(&saved)?;
            tracing::debug!("session saved for {}", saved.session.email);

            output_success(
                &output_format,
                &format!("Logged in as {} ({})", saved.session.email, saved.session.role),
                Some(json!({ "session": saved.session, "expires_at": saved.expires_at })),
            )
        }
        AuthCommands::Whoami => {
            let (api, _) = authenticated_client(&config().client)?;
            let session = api.session().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
                OutputFormat::Text => {
                    println!("Email: {}", session.email);
                    println!("Name: {}", session.name);
                    println!("Role: {}", session.role);
                }
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let message = if clear_session()? {
                "Logged out"
            } else {
                "No stored session"
            };
            output_success(&output_format, message, None)
        }
    }
}
