use crate::domain::model::QueryResult;
use crate::entities::Entity;
use crate::utils::error::{CrmError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Which names record columns are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// Declared aliases; entity types without aliases fall back to raw names.
    Alias,
    Raw,
}

pub fn render(
    result: &QueryResult,
    entities: &[Entity],
    format: OutputFormat,
    keys: KeyStyle,
) -> Result<String> {
    match (result, format) {
        (QueryResult::NoData, OutputFormat::Json) => Ok("null".to_string()),
        (QueryResult::NoData, OutputFormat::Csv) => Ok(String::new()),
        (QueryResult::Records(_), OutputFormat::Json) => entities_to_json(entities, keys),
        (QueryResult::Records(_), OutputFormat::Csv) => entities_to_csv(entities, keys),
        (QueryResult::Ids(ids), OutputFormat::Json) => Ok(serde_json::to_string_pretty(ids)?),
        (QueryResult::Ids(ids), OutputFormat::Csv) => ids_to_csv(ids),
        (QueryResult::Other(value), OutputFormat::Json) => Ok(serde_json::to_string_pretty(value)?),
        (QueryResult::Other(_), OutputFormat::Csv) => Err(CrmError::InvalidConfigValueError {
            field: "format".to_string(),
            value: "csv".to_string(),
            reason: "This method's result has no tabular form, use json".to_string(),
        }),
    }
}

fn keyed(entity: &Entity, keys: KeyStyle) -> Map<String, Value> {
    match keys {
        KeyStyle::Alias if !entity.definition().aliases().is_empty() => {
            entity.to_alias_map().into_iter().collect()
        }
        _ => entity
            .to_raw_map()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

pub fn entities_to_json(entities: &[Entity], keys: KeyStyle) -> Result<String> {
    let rows: Vec<Value> = entities
        .iter()
        .map(|entity| Value::Object(keyed(entity, keys)))
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

pub fn entities_to_csv(entities: &[Entity], keys: KeyStyle) -> Result<String> {
    let rows: Vec<Map<String, Value>> = entities.iter().map(|entity| keyed(entity, keys)).collect();
    let headers: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(headers.iter().map(|header| cell(row.get(*header))))?;
    }

    finish(writer)
}

pub fn ids_to_csv(ids: &[String]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id"])?;
    for id in ids {
        writer.write_record([id])?;
    }
    finish(writer)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CrmError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CrmError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
