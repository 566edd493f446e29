use serde_json::{Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::resources::{FieldType, FormField};
use crate::types::Record;

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("form has {} invalid field(s)", .0.len())]
pub struct FormErrors(pub BTreeMap<String, String>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }
}

/// Validate and normalise submitted values against the declared fields.
///
/// Only declared fields are kept. Numbers arriving as text are coerced,
/// empty optional inputs are dropped. Any error blocks submission.
pub fn validate_form(fields: &[FormField], values: &Record) -> Result<Record, FormErrors> {
    let mut errors = FormErrors::default();
    let mut clean = Record::new();

    for field in fields {
        let value = values.get(&field.name).cloned().unwrap_or(Value::Null);

        if is_empty(field.field_type, &value) {
            if field.required {
                errors.add(&field.name, format!("{} is required", field.label));
            } else if field.field_type == FieldType::Checkbox {
                clean.insert(field.name.clone(), Value::Bool(false));
            }
            continue;
        }

        match normalise(field, value) {
            Ok(value) => {
                clean.insert(field.name.clone(), value);
            }
            Err(message) => errors.add(&field.name, message),
        }
    }

    if errors.is_empty() {
        Ok(clean)
    } else {
        Err(errors)
    }
}

fn is_empty(field_type: FieldType, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Bool(checked) => field_type == FieldType::Checkbox && !checked,
        _ => false,
    }
}

fn normalise(field: &FormField, value: Value) -> Result<Value, String> {
    match field.field_type {
        FieldType::Number => match value {
            Value::Number(_) => Ok(value),
            Value::String(s) => parse_number(s.trim())
                .map(Value::Number)
                .ok_or_else(|| format!("{} must be a number", field.label)),
            _ => Err(format!("{} must be a number", field.label)),
        },
        FieldType::Checkbox => match value {
            Value::Bool(_) => Ok(value),
            Value::String(s) => match s.as_str() {
                "true" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("{} must be checked or unchecked", field.label)),
            },
            _ => Err(format!("{} must be checked or unchecked", field.label)),
        },
        FieldType::Email => match &value {
            Value::String(s) if looks_like_email(s.trim()) => Ok(Value::String(s.trim().to_string())),
            _ => Err(format!("{} must be an email address", field.label)),
        },
        FieldType::Select => {
            let options = field.options.as_deref().unwrap_or_default();
            match &value {
                Value::String(s) if !field.required || options.iter().any(|o| o == s) => Ok(value),
                Value::String(_) => Err(format!("{} must be one of: {}", field.label, options.join(", "))),
                _ => Err(format!("{} must be one of: {}", field.label, options.join(", "))),
            }
        }
        FieldType::Text | FieldType::Password | FieldType::Textarea => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(format!("{} must be text", field.label)),
        },
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn looks_like_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !text.contains(char::is_whitespace),
        None => false,
    }
}
