//! Output helpers shared by the commands.

use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

/// Output format for command reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Prints `text` or the pretty JSON form of `value`, depending on `format`.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", text(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Writes `value` as pretty JSON to `path`.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}

/// Writes one CSV row per record, with a header taken from the field names.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    tracing::info!("{} rows written to {}", records.len(), path.display());
    Ok(())
}

/// Parses a comma-separated list such as `"1,2,3"`.
pub fn parse_list<T>(s: &str, what: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .map_err(|e| anyhow!("Invalid {} value '{}': {}", what, part, e))
        })
        .collect()
}

/// Horizontal rule used by the text reports.
pub const RULE: &str = "---------------------------------------------------------------";

/// Boxed section header used by the text reports.
pub fn banner(title: &str) -> String {
    let line = "===============================================================";
    format!("\n{line}\n{title:^63}\n{line}\n")
}
