use clap::Subcommand;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::rbac::{is_allowed, Role};

#[derive(Subcommand)]
pub enum AccessCommands {
    #[command(about = "Check whether a role satisfies a required role")]
    Check {
        #[arg(help = "Current role (user, operator, admin)")]
        role: Role,
        #[arg(help = "Required role")]
        required: Role,
    },
}

pub async fn handle(cmd: AccessCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AccessCommands::Check { role, required } => {
            let allowed = is_allowed(role, required);
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "role": role,
                        "required": required,
                        "allowed": allowed,
                    }))?
                ),
                OutputFormat::Text if allowed => println!("✓ {} may access {} pages", role, required),
                OutputFormat::Text => println!("✗ {} may not access {} pages", role, required),
            }
            Ok(())
        }
    }
}
