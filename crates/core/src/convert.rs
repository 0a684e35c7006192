//! YAML document to report-table conversion
//!
//! Takes a parsed YAML document - optionally unwrapped by an outer key -
//! and shapes it into a [`ReportTable`](crate::report::ReportTable) on the
//! shared schema. Cells the document does not set are written as the
//! [`NO_DATA`] placeholder when the table is serialized.

use serde_yaml::Value;

use crate::report::{ReportRow, ReportTable};

/// Placeholder written for cells the source document never set.
pub const NO_DATA: &str = "no_data";

/// Error type for YAML conversion
#[derive(Debug)]
pub enum ConvertError {
    MissingOuterKey(String),
    UnexpectedShape(String),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::MissingOuterKey(key) => {
                write!(f, "outer key {:?} not found in the document", key)
            }
            ConvertError::UnexpectedShape(msg) => write!(f, "unexpected document shape: {}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Render a scalar cell value to its string form. Nested sequences and
/// mappings have no cell representation and read as unset.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Build a report table from a YAML document.
///
/// With a non-empty `outer_key` the conversion descends into that top-level
/// key first, failing when the key is absent. The document (or the unwrapped
/// value) must be a sequence of mappings; keys outside the shared schema are
/// dropped.
pub fn yaml_to_table(data: &Value, outer_key: Option<&str>) -> Result<ReportTable, ConvertError> {
    let data = match outer_key {
        Some(key) if !key.is_empty() => data
            .get(key)
            .ok_or_else(|| ConvertError::MissingOuterKey(key.to_string()))?,
        _ => data,
    };

    let entries = data.as_sequence().ok_or_else(|| {
        ConvertError::UnexpectedShape("expected a sequence of mappings".to_string())
    })?;

    let mut table = ReportTable::new();
    for entry in entries {
        let mapping = entry.as_mapping().ok_or_else(|| {
            ConvertError::UnexpectedShape("expected every entry to be a mapping".to_string())
        })?;

        let mut row = ReportRow::default();
        for (key, value) in mapping {
            let Some(column) = key.as_str() else {
                continue;
            };
            if let Some(text) = scalar_to_string(value) {
                row.set(column, text);
            }
        }
        table.push(row);
    }
    Ok(table)
}
