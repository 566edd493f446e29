use clap::Subcommand;
use std::sync::Arc;

use crate::cli::config::authenticated_client;
use crate::cli::utils::{output_record, output_success, output_table, read_stdin_record};
use crate::cli::OutputFormat;
use crate::client::{ListParams, ResourceApi};
use crate::config::config;
use crate::renderer::{Completion, PageError, PageOptions, ResourcePage};
use crate::resources::AdminCatalog;
use crate::types::Record;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List one page of records")]
    List {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, help = "Free-text search")]
        search: Option<String>,
    },

    #[command(about = "Show a single record")]
    Get {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from a JSON object on stdin")]
    Create {
        #[arg(help = "Resource name")]
        resource: String,
    },

    #[command(about = "Update a record with a JSON object on stdin")]
    Update {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to delete")]
        id: String,
    },
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let catalog = AdminCatalog::builtin()?;
    let (client, _) = authenticated_client(&config().client)?;
    let api: Arc<dyn ResourceApi> = Arc::new(client);

    // one-shot commands never need the list reloaded after a mutation
    let open = |resource: &str| -> anyhow::Result<ResourcePage> {
        Ok(ResourcePage::open(&catalog.registry, resource, api.clone())?.with_options(PageOptions {
            reload_after_mutation: false,
        }))
    };

    match cmd {
        DataCommands::List { resource, page, limit, search } => {
            let view = open(&resource)?;
            let mut params = ListParams::new().page(page).limit(limit);
            if let Some(term) = search {
                params = params.search(term);
            }
            view.set_params(params);
            view.load().await.map_err(describe)?;

            let state = view.state().await;
            let value = serde_json::json!({
                "data": state.rows,
                "total": state.total,
                "page": state.page,
                "limit": state.limit,
            });
            output_table(&output_format, &value, &view.headers(), &view.render_rows().await)?;
            if let OutputFormat::Text = output_format {
                println!("\n{} of {} shown (page {})", state.rows.len(), state.total, state.page);
            }
            Ok(())
        }
        DataCommands::Get { resource, id } => {
            let descriptor = catalog.registry.get(&resource)?;
            let record = api
                .get_one(&descriptor.endpoint, &id)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            output_record(&output_format, &record)
        }
        DataCommands::Create { resource } => {
            let view = open(&resource)?;
            let values = read_stdin_record()?;
            let created = applied(view.create(&values).await)?;
            output_success(&output_format, &format!("Created {} record", resource), Some(created.into()))
        }
        DataCommands::Update { resource, id } => {
            let view = open(&resource)?;
            let patch = read_stdin_record()?;

            // the form is validated as a whole, so start from the stored record
            let mut values: Record = api
                .get_one(&view.descriptor().endpoint, &id)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            values.extend(patch);

            let updated = applied(view.update(&id, &values).await)?;
            output_success(&output_format, &format!("Updated {} record {}", resource, id), Some(updated.into()))
        }
        DataCommands::Delete { resource, id } => {
            let view = open(&resource)?;
            let deleted = applied(view.remove(&id).await)?;
            output_success(&output_format, &format!("Deleted {} record {}", resource, id), Some(deleted.into()))
        }
    }
}

fn applied(result: Result<Completion<Record>, PageError>) -> anyhow::Result<Record> {
    match result.map_err(describe)? {
        Completion::Applied(record) => Ok(record),
        Completion::Discarded => Err(anyhow::anyhow!("Request was cancelled")),
    }
}

fn describe(error: PageError) -> anyhow::Error {
    match error {
        PageError::Invalid(errors) => {
            let details: Vec<String> = errors.0.iter().map(|(field, msg)| format!("  {}: {}", field, msg)).collect();
            anyhow::anyhow!("Invalid input:\n{}", details.join("\n"))
        }
        other => anyhow::anyhow!(other.to_string()),
    }
}
