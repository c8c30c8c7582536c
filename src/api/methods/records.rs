use super::{envelope, has_nodata_marker, one_or_many, record_from_fields};
use crate::domain::model::{Query, QueryResult};
use crate::domain::ports::ResponseInterpreter;
use crate::utils::error::{CrmError, Result};
use serde_json::Value;

/// Record-returning reads (`getRecords`, `getRecordById`, `searchRecords`, ...).
///
/// Rows live under `response.result.<Module>.row`; a single row and a single
/// field are sent as bare objects rather than one-element arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordList;

impl ResponseInterpreter for RecordList {
    fn has_data(&self, response: &Value, _query: &Query) -> Result<bool> {
        let envelope = envelope(response)?;
        if has_nodata_marker(envelope) {
            return Ok(false);
        }
        if !envelope.contains_key("result") {
            return Err(CrmError::structural("response.result"));
        }
        Ok(true)
    }

    fn normalize(&self, response: &Value, query: &Query) -> Result<QueryResult> {
        let rows_path = format!("response.result.{}.row", query.module());
        let rows = envelope(response)?
            .get("result")
            .and_then(|result| result.get(query.module()))
            .and_then(|module| module.get("row"))
            .ok_or_else(|| CrmError::structural(rows_path.as_str()))?;

        let records = one_or_many(rows)
            .into_iter()
            .map(|row| {
                let fields = row
                    .get("FL")
                    .ok_or_else(|| CrmError::structural(format!("{rows_path}.FL")))?;
                record_from_fields(fields, &rows_path)
            })
            .collect::<Result<Vec<_>>>()?;

        if records.is_empty() {
            Ok(QueryResult::NoData)
        } else {
            Ok(QueryResult::Records(records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Method;
    use serde_json::json;

    fn query() -> Query {
        Query::new(Method::GetRecords, "Contacts")
    }

    #[test]
    fn test_rows_array() {
        let response = json!({"response": {"uri": "/crm/private/json/Contacts/getRecords", "result": {"Contacts": {"row": [
            {"no": "1", "FL": [
                {"val": "CONTACTID", "content": "1001"},
                {"val": "First Name", "content": "Ada"}
            ]},
            {"no": "2", "FL": [
                {"val": "CONTACTID", "content": "1002"},
                {"val": "First Name", "content": "Grace"}
            ]}
        ]}}}});

        assert!(RecordList.has_data(&response, &query()).unwrap());
        let QueryResult::Records(records) = RecordList.normalize(&response, &query()).unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data.get("First Name"), Some(&json!("Grace")));
    }

    #[test]
    fn test_single_row_single_field() {
        let response = json!({"response": {"result": {"Contacts": {"row": {
            "no": "1", "FL": {"val": "CONTACTID", "content": "1001"}
        }}}}});

        let QueryResult::Records(records) = RecordList.normalize(&response, &query()).unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.get("CONTACTID"), Some(&json!("1001")));
    }

    #[test]
    fn test_nodata() {
        let response = json!({"response": {"nodata": {"code": "4422", "message": "There is no data to show"}}});
        assert!(!RecordList.has_data(&response, &query()).unwrap());
    }

    #[test]
    fn test_missing_result_is_structural() {
        let response = json!({"response": {"uri": "/crm/private/json/Contacts/getRecords"}});
        assert!(matches!(
            RecordList.has_data(&response, &query()),
            Err(CrmError::StructuralResponse { .. })
        ));
    }

    #[test]
    fn test_wrong_module_key_is_structural() {
        let response = json!({"response": {"result": {"Leads": {"row": []}}}});
        match RecordList.normalize(&response, &query()) {
            Err(CrmError::StructuralResponse { path }) => {
                assert_eq!(path, "response.result.Contacts.row")
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }
}
