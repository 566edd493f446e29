use serde_json::{json, Value};
use std::io::Read;

use crate::cli::OutputFormat;
use crate::renderer::text_table;
use crate::types::Record;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// JSON prints `value` as is; text prints a table.
pub fn output_table(
    output_format: &OutputFormat,
    value: &Value,
    headers: &[String],
    rows: &[Vec<String>],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("(no rows)");
            } else {
                println!("{}", text_table(headers, rows));
            }
        }
    }
    Ok(())
}

/// Output a single record; text lists one `key: value` per line.
pub fn output_record(output_format: &OutputFormat, record: &Record) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => {
            for (key, value) in record {
                match value {
                    Value::String(s) => println!("{}: {}", key, s),
                    other => println!("{}: {}", key, other),
                }
            }
        }
    }
    Ok(())
}

/// Parse a JSON object from `input`.
pub fn parse_record(input: &str) -> anyhow::Result<Record> {
    match serde_json::from_str::<Value>(input.trim())? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!("Expected a JSON object")),
    }
}

/// Read a JSON object from stdin.
pub fn read_stdin_record() -> anyhow::Result<Record> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        anyhow::bail!("Expected a JSON object on stdin");
    }
    parse_record(&input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_requires_an_object() {
        let record = parse_record(r#" {"title": "Rust"} "#).unwrap();
        assert_eq!(record["title"], "Rust");

        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("not json").is_err());
    }
}
