//! Per-method response interpretation.
//!
//! Every CRM method answers inside a `{"response": {...}}` envelope that holds
//! either `nodata`, `error` or `result`. Each method owns a
//! [`ResponseInterpreter`] that knows how its own `result` looks.

pub mod deleted_record_ids;
pub mod fields;
pub mod records;
pub mod write_result;

use crate::domain::model::{Method, Query, QueryResult, Record};
use crate::domain::ports::ResponseInterpreter;
use crate::utils::error::{CrmError, Result};
use serde_json::{Map, Value};

pub use deleted_record_ids::DeletedRecordIds;
pub use fields::Fields;
pub use records::RecordList;
pub use write_result::WriteResult;

pub fn interpreter_for(method: Method) -> &'static dyn ResponseInterpreter {
    match method {
        Method::GetDeletedRecordIds => &DeletedRecordIds,
        Method::GetFields => &Fields,
        Method::GetRecordById
        | Method::GetRecords
        | Method::GetMyRecords
        | Method::SearchRecords => &RecordList,
        Method::InsertRecords | Method::UpdateRecords => &WriteResult,
    }
}

/// Runs the full classification for one response: API error first, then
/// `has_data`, then `normalize` only when there is something to normalize.
pub fn interpret(response: &Value, query: &Query) -> Result<QueryResult> {
    check_api_error(response)?;

    let interpreter = interpreter_for(query.method());
    if !interpreter.has_data(response, query)? {
        tracing::debug!("{} on {} returned no data", query.method(), query.module());
        return Ok(QueryResult::NoData);
    }

    let result = interpreter.normalize(response, query)?;
    tracing::debug!(
        "{} on {} normalized into {} item(s)",
        query.method(),
        query.module(),
        result.len()
    );
    Ok(result)
}

/// Surfaces `response.error` as [`CrmError::ApiResponse`].
pub fn check_api_error(response: &Value) -> Result<()> {
    let Some(error) = response.pointer("/response/error") else {
        return Ok(());
    };

    let code = error
        .get("code")
        .map(scalar_to_string)
        .unwrap_or_else(|| "unknown".to_string());
    let message = error
        .get("message")
        .map(scalar_to_string)
        .unwrap_or_default();

    tracing::warn!("API error {}: {}", code, message);
    Err(CrmError::ApiResponse { code, message })
}

/// The `response` object every method answers with.
pub(crate) fn envelope(response: &Value) -> Result<&Map<String, Value>> {
    response
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| CrmError::structural("response"))
}

pub(crate) fn has_nodata_marker(envelope: &Map<String, Value>) -> bool {
    envelope.contains_key("nodata")
}

/// Loose emptiness as the API means it: null, false, "", "0", 0 and empty containers.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// The API sends a lone object where a one-element array is meant.
pub(crate) fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Flattens a `FL` list of `{"val": name, "content": value}` pairs into a record.
pub(crate) fn record_from_fields(fields: &Value, path: &str) -> Result<Record> {
    let mut record = Record::default();
    for field in one_or_many(fields) {
        let name = field
            .get("val")
            .and_then(Value::as_str)
            .ok_or_else(|| CrmError::structural(format!("{path}.FL.val")))?;
        let content = field.get("content").cloned().unwrap_or(Value::Null);
        record.data.insert(name.to_string(), content);
    }
    Ok(record)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
