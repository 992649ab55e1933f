//! Output formatters for results, statistics and normalized text.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::core::Result;

/// Output format enum.
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Json,
    Markdown,
    Text,
}

impl Format {
    pub fn format_value<W: Write>(&self, value: &Value, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => format_json(value, writer),
            Format::Markdown => format_value_as_markdown(value, writer, 0),
            Format::Text => format_value_as_text(value, writer, 0),
        }
    }

    pub fn format<T: Serialize, W: Write>(&self, data: &T, writer: &mut W) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.format_value(&value, writer)
    }
}

fn format_json<W: Write>(value: &Value, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn format_value_as_markdown<W: Write>(value: &Value, writer: &mut W, depth: usize) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let header_level = "#".repeat((depth + 1).min(6));
                if is_nested(val) {
                    writeln!(writer, "{} {}\n", header_level, format_key(key))?;
                    format_value_as_markdown(val, writer, depth + 1)?;
                } else {
                    writeln!(writer, "**{}**: {}\n", format_key(key), format_scalar(val))?;
                }
            }
        }
        Value::Array(arr) if arr.is_empty() => {
            writeln!(writer, "_No results_\n")?;
        }
        Value::Array(arr) if is_table_compatible(arr) => {
            format_as_table(arr, writer)?;
        }
        Value::Array(arr) => {
            for item in arr {
                writeln!(writer, "---\n")?;
                format_value_as_markdown(item, writer, depth)?;
            }
        }
        _ => {
            writeln!(writer, "{}\n", format_scalar(value))?;
        }
    }
    Ok(())
}

/// `similarity_score` and `yearCreated` both become title-cased words.
fn format_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c == '_' {
            spaced.push(' ');
        } else if c.is_uppercase() && i > 0 {
            spaced.push(' ');
            spaced.push(c);
        } else {
            spaced.push(c);
        }
    }
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => format_float(f),
            _ => n.to_string(),
        },
        Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Scores carry four decimals; trailing zeros are dropped.
fn format_float(f: f64) -> String {
    let s = format!("{f:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn is_scalar_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.iter().all(|v| !is_nested(v)))
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(_) => !is_scalar_list(value),
        _ => false,
    }
}

fn is_table_compatible(arr: &[Value]) -> bool {
    !arr.is_empty()
        && arr.iter().all(|v| {
            if let Value::Object(map) = v {
                map.values().all(|v| !is_nested(v))
            } else {
                false
            }
        })
}

fn format_as_table<W: Write>(arr: &[Value], writer: &mut W) -> Result<()> {
    // Get headers from first object
    let headers: Vec<&str> = match arr.first() {
        Some(Value::Object(map)) => map.keys().map(|s| s.as_str()).collect(),
        _ => return Ok(()),
    };

    write!(writer, "|")?;
    for header in &headers {
        write!(writer, " {} |", format_key(header))?;
    }
    writeln!(writer)?;

    write!(writer, "|")?;
    for _ in &headers {
        write!(writer, " --- |")?;
    }
    writeln!(writer)?;

    for item in arr {
        if let Value::Object(map) = item {
            write!(writer, "|")?;
            for header in &headers {
                let value = map.get(*header).unwrap_or(&Value::Null);
                write!(writer, " {} |", format_scalar(value).replace('|', "\\|"))?;
            }
            writeln!(writer)?;
        }
    }

    writeln!(writer)?;
    Ok(())
}

fn format_value_as_text<W: Write>(value: &Value, writer: &mut W, indent: usize) -> Result<()> {
    let prefix = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if is_nested(val) {
                    writeln!(writer, "{}{}:", prefix, format_key(key))?;
                    format_value_as_text(val, writer, indent + 1)?;
                } else {
                    writeln!(
                        writer,
                        "{}{}: {}",
                        prefix,
                        format_key(key),
                        format_scalar(val)
                    )?;
                }
            }
        }
        Value::Array(arr) if arr.is_empty() => {
            writeln!(writer, "{}No results", prefix)?;
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                writeln!(writer, "{}#{}", prefix, i + 1)?;
                format_value_as_text(item, writer, indent + 1)?;
            }
        }
        _ => {
            writeln!(writer, "{}{}", prefix, format_scalar(value))?;
        }
    }
    Ok(())
}
