use super::{envelope, has_nodata_marker, is_empty_value};
use crate::domain::model::{Query, QueryResult};
use crate::domain::ports::ResponseInterpreter;
use crate::utils::error::{CrmError, Result};
use serde_json::Value;

/// `getDeletedRecordIds`: the result is one comma-separated string of ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletedRecordIds;

const RESULT_PATH: &str = "response.result.DeletedIDs";

fn deleted_ids(response: &Value) -> Result<Option<&Value>> {
    let envelope = envelope(response)?;
    Ok(envelope.get("result").and_then(|result| result.get("DeletedIDs")))
}

impl ResponseInterpreter for DeletedRecordIds {
    fn has_data(&self, response: &Value, query: &Query) -> Result<bool> {
        if has_nodata_marker(envelope(response)?) {
            return Ok(false);
        }

        match deleted_ids(response)? {
            None => Ok(false),
            // Past the last page the API answers `"DeletedIDs": true` instead of `nodata`.
            Some(Value::Bool(true)) => {
                tracing::warn!(
                    "{} on {}: DeletedIDs is `true`, treating as past the last page",
                    query.method(),
                    query.module()
                );
                Ok(false)
            }
            Some(value) if is_empty_value(value) => Ok(false),
            Some(Value::String(_) | Value::Number(_)) => Ok(true),
            Some(_) => Err(CrmError::structural(RESULT_PATH)),
        }
    }

    fn normalize(&self, response: &Value, _query: &Query) -> Result<QueryResult> {
        let raw = match deleted_ids(response)? {
            Some(Value::String(ids)) => ids.clone(),
            // A single id may come back as a bare number.
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(CrmError::structural(RESULT_PATH)),
        };

        // Whitespace around an id is dropped, so " 2" is "2" and " " is no id.
        let ids: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if ids.is_empty() {
            Ok(QueryResult::NoData)
        } else {
            Ok(QueryResult::Ids(ids))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Method;
    use serde_json::json;

    fn query() -> Query {
        Query::new(Method::GetDeletedRecordIds, "Contacts")
    }

    #[test]
    fn test_ids_with_empty_tokens() {
        let response = json!({"response": {"result": {"DeletedIDs": "1,2,,3"}}});
        assert!(DeletedRecordIds.has_data(&response, &query()).unwrap());
        assert_eq!(
            DeletedRecordIds.normalize(&response, &query()).unwrap(),
            QueryResult::Ids(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_true_sentinel_means_no_data() {
        let response = json!({"response": {"result": {"DeletedIDs": true}}});
        assert!(!DeletedRecordIds.has_data(&response, &query()).unwrap());
    }

    #[test]
    fn test_nodata_marker() {
        let response = json!({"response": {"nodata": true}});
        assert!(!DeletedRecordIds.has_data(&response, &query()).unwrap());

        let detailed = json!({"response": {"nodata": {"code": "4422", "message": "There is no data to show"}}});
        assert!(!DeletedRecordIds.has_data(&detailed, &query()).unwrap());
    }

    #[test]
    fn test_missing_or_empty_result() {
        for response in [
            json!({"response": {}}),
            json!({"response": {"result": {}}}),
            json!({"response": {"result": {"DeletedIDs": ""}}}),
            json!({"response": {"result": {"DeletedIDs": null}}}),
            json!({"response": {"result": {"DeletedIDs": false}}}),
        ] {
            assert!(
                !DeletedRecordIds.has_data(&response, &query()).unwrap(),
                "expected no data for {}",
                response
            );
        }
    }

    #[test]
    fn test_only_separators_normalizes_to_no_data() {
        let response = json!({"response": {"result": {"DeletedIDs": ",,"}}});
        assert!(DeletedRecordIds.has_data(&response, &query()).unwrap());
        assert_eq!(
            DeletedRecordIds.normalize(&response, &query()).unwrap(),
            QueryResult::NoData
        );
    }

    #[test]
    fn test_missing_envelope_is_structural() {
        let response = json!({"result": {"DeletedIDs": "1"}});
        assert!(matches!(
            DeletedRecordIds.has_data(&response, &query()),
            Err(CrmError::StructuralResponse { .. })
        ));
        assert!(matches!(
            DeletedRecordIds.normalize(&response, &query()),
            Err(CrmError::StructuralResponse { .. })
        ));
    }

    #[test]
    fn test_non_scalar_ids_are_structural() {
        for ids in [json!(["1", "2"]), json!({"id": "1"})] {
            let response = json!({"response": {"result": {"DeletedIDs": ids}}});
            assert!(matches!(
                DeletedRecordIds.has_data(&response, &query()),
                Err(CrmError::StructuralResponse { ref path }) if path == RESULT_PATH
            ));
        }
    }

    #[test]
    fn test_single_numeric_id() {
        let response = json!({"response": {"result": {"DeletedIDs": 2000001}}});
        assert!(DeletedRecordIds.has_data(&response, &query()).unwrap());
        assert_eq!(
            DeletedRecordIds.normalize(&response, &query()).unwrap(),
            QueryResult::Ids(vec!["2000001".to_string()])
        );
    }

    #[test]
    fn test_whitespace_around_ids_is_trimmed() {
        let response = json!({"response": {"result": {"DeletedIDs": " 1, 2 , ,3"}}});
        assert_eq!(
            DeletedRecordIds.normalize(&response, &query()).unwrap(),
            QueryResult::Ids(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }
}
