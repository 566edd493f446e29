use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::resources::{CellFormat, ColumnDef};
use crate::types::Record;

/// Custom cell renderer: `(value, whole record) -> text`.
pub type RenderFn = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// Per-column render functions registered by the presentation layer.
#[derive(Clone, Default)]
pub struct ColumnRenderers {
    renderers: HashMap<String, RenderFn>,
}

impl std::fmt::Debug for ColumnRenderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.renderers.keys()).finish()
    }
}

impl ColumnRenderers {
    pub fn insert<F>(&mut self, key: impl Into<String>, render: F)
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(key.into(), Arc::new(render));
    }

    /// Render one cell: custom function, else declared format, else raw value.
    pub fn render(&self, column: &ColumnDef, record: &Record) -> String {
        let value = record.get(&column.key).unwrap_or(&Value::Null);
        match self.renderers.get(&column.key) {
            Some(render) => render(value, record),
            None => format_value(value, column.format.unwrap_or(CellFormat::Raw)),
        }
    }
}

pub fn format_value(value: &Value, format: CellFormat) -> String {
    match format {
        CellFormat::Raw => raw(value),
        CellFormat::Date => format_date(value),
        CellFormat::Boolean => match value {
            Value::Bool(true) => "Yes".to_string(),
            Value::Bool(false) | Value::Null => "No".to_string(),
            other => raw(other),
        },
        CellFormat::Badge => match value {
            Value::Null => String::new(),
            other => format!("[{}]", raw(other)),
        },
        CellFormat::Count => match value {
            Value::Array(items) => items.len().to_string(),
            Value::Null => "0".to_string(),
            other => raw(other),
        },
    }
}

fn raw(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_date(value: &Value) -> String {
    let Value::String(text) = value else {
        return raw(value);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return ts.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    text.clone()
}

/// Resolves icon names from configuration to something displayable.
pub trait IconSet: Send + Sync {
    fn glyph(&self, name: &str) -> Option<&str>;
}

/// Plain-text glyphs for terminal output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextIcons;

impl IconSet for TextIcons {
    fn glyph(&self, name: &str) -> Option<&str> {
        let glyph = match name {
            "home" => "⌂",
            "users" => "☺",
            "book" => "▤",
            "file" => "▯",
            "clipboard" => "▦",
            "chat" => "✉",
            "settings" => "⚙",
            _ => return None,
        };
        Some(glyph)
    }
}

/// `glyph label`, or just the label when the icon is unknown or absent.
pub fn label_with_icon(icons: &dyn IconSet, icon: Option<&str>, label: &str) -> String {
    match icon.and_then(|name| icons.glyph(name)) {
        Some(glyph) => format!("{} {}", glyph, label),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(key: &str, format: Option<CellFormat>) -> ColumnDef {
        ColumnDef {
            key: key.into(),
            title: key.into(),
            format,
        }
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn formats_by_hint() {
        assert_eq!(format_value(&json!("2025-03-04T10:00:00Z"), CellFormat::Date), "2025-03-04");
        assert_eq!(format_value(&json!(true), CellFormat::Boolean), "Yes");
        assert_eq!(format_value(&json!("admin"), CellFormat::Badge), "[admin]");
        assert_eq!(format_value(&json!([1, 2, 3]), CellFormat::Count), "3");
        assert_eq!(format_value(&json!(42), CellFormat::Raw), "42");
        assert_eq!(format_value(&Value::Null, CellFormat::Raw), "");
    }

    #[test]
    fn custom_renderer_sees_value_and_record() {
        let mut renderers = ColumnRenderers::default();
        renderers.insert("name", |value, record| {
            format!("{} <{}>", value.as_str().unwrap_or(""), record["email"].as_str().unwrap_or(""))
        });
        let row = record(json!({"name": "Ada", "email": "ada@academy.test"}));
        assert_eq!(renderers.render(&column("name", None), &row), "Ada <ada@academy.test>");
        assert_eq!(renderers.render(&column("email", None), &row), "ada@academy.test");
    }

    #[test]
    fn icons_resolve_at_render_time() {
        assert_eq!(label_with_icon(&TextIcons, Some("book"), "Courses"), "▤ Courses");
        assert_eq!(label_with_icon(&TextIcons, Some("rocket"), "Launch"), "Launch");
        assert_eq!(label_with_icon(&TextIcons, None, "Plain"), "Plain");
    }
}
