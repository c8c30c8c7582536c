use super::{envelope, has_nodata_marker, one_or_many, record_from_fields};
use crate::domain::model::{Query, QueryResult};
use crate::domain::ports::ResponseInterpreter;
use crate::utils::error::{CrmError, Result};
use serde_json::Value;

/// `insertRecords` / `updateRecords`: the API echoes the touched records'
/// identifiers and timestamps under `response.result.recorddetail`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteResult;

const DETAIL_PATH: &str = "response.result.recorddetail";

impl ResponseInterpreter for WriteResult {
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

    fn normalize(&self, response: &Value, _query: &Query) -> Result<QueryResult> {
        let details = envelope(response)?
            .get("result")
            .and_then(|result| result.get("recorddetail"))
            .ok_or_else(|| CrmError::structural(DETAIL_PATH))?;

        let records = one_or_many(details)
            .into_iter()
            .map(|detail| {
                let fields = detail
                    .get("FL")
                    .ok_or_else(|| CrmError::structural(format!("{DETAIL_PATH}.FL")))?;
                record_from_fields(fields, DETAIL_PATH)
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

    #[test]
    fn test_insert_detail() {
        let query = Query::new(Method::InsertRecords, "Contacts");
        let response = json!({"response": {"uri": "/crm/private/json/Contacts/insertRecords", "result": {
            "message": "Record(s) added successfully",
            "recorddetail": {"FL": [
                {"val": "Id", "content": "2000000017001"},
                {"val": "Created Time", "content": "2024-05-02 10:11:12"}
            ]}
        }}});

        assert!(WriteResult.has_data(&response, &query).unwrap());
        let QueryResult::Records(records) = WriteResult.normalize(&response, &query).unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.get("Id"), Some(&json!("2000000017001")));
    }

    #[test]
    fn test_missing_detail_is_structural() {
        let query = Query::new(Method::UpdateRecords, "Contacts");
        let response = json!({"response": {"result": {"message": "Record(s) updated successfully"}}});
        assert!(WriteResult.has_data(&response, &query).unwrap());
        assert!(matches!(
            WriteResult.normalize(&response, &query),
            Err(CrmError::StructuralResponse { .. })
        ));
    }

    #[test]
    fn test_missing_result_is_structural() {
        let query = Query::new(Method::InsertRecords, "Contacts");
        let response = json!({"response": {"uri": "/crm/private/json/Contacts/insertRecords"}});
        assert!(matches!(
            WriteResult.has_data(&response, &query),
            Err(CrmError::StructuralResponse { ref path }) if path == "response.result"
        ));
        assert!(matches!(
            crate::api::methods::interpret(&response, &query),
            Err(CrmError::StructuralResponse { .. })
        ));
    }

    #[test]
    fn test_nodata_write() {
        let query = Query::new(Method::UpdateRecords, "Contacts");
        let response = json!({"response": {"nodata": {"code": "4422", "message": "There is no data to show"}}});
        assert!(!WriteResult.has_data(&response, &query).unwrap());
    }
}
