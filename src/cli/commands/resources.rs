use serde_json::json;

use crate::cli::config::load_session;
use crate::cli::utils::output_table;
use crate::cli::OutputFormat;
use crate::rbac::is_allowed;
use crate::renderer::{label_with_icon, TextIcons};
use crate::resources::AdminCatalog;

/// Lists the embedded catalog. With a stored session, marks what its role may open.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let catalog = AdminCatalog::builtin()?;
    let role = load_session()?.map(|saved| saved.session.role);

    let mut entries = Vec::new();
    let mut rows = Vec::new();
    for descriptor in catalog.registry.iter() {
        let required = descriptor.access_role();
        let accessible = role.map(|current| is_allowed(current, required));

        rows.push(vec![
            descriptor.name.clone(),
            label_with_icon(&TextIcons, descriptor.icon.as_deref(), descriptor.display_title()),
            descriptor.endpoint.clone(),
            required.to_string(),
            match accessible {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
        ]);
        entries.push(json!({
            "name": descriptor.name,
            "title": descriptor.display_title(),
            "endpoint": descriptor.endpoint,
            "required_role": required,
            "accessible": accessible,
        }));
    }

    let headers: Vec<String> = ["Name", "Title", "Endpoint", "Role", "Access"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    output_table(&output_format, &json!({ "resources": entries }), &headers, &rows)
}
