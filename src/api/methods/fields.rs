use super::{envelope, has_nodata_marker, one_or_many};
use crate::domain::model::{Query, QueryResult};
use crate::domain::ports::ResponseInterpreter;
use crate::utils::error::{CrmError, Result};
use serde_json::Value;

/// `getFields` answers with `{"<Module>": {"section": [...]}}` and only falls
/// back to the usual `response` envelope when it has nothing to say.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fields;

impl ResponseInterpreter for Fields {
    fn has_data(&self, response: &Value, query: &Query) -> Result<bool> {
        if let Some(module) = response.get(query.module()) {
            return Ok(module.get("section").is_some());
        }
        Ok(!has_nodata_marker(envelope(response)?))
    }

    fn normalize(&self, response: &Value, query: &Query) -> Result<QueryResult> {
        let sections = response
            .get(query.module())
            .and_then(|module| module.get("section"))
            .ok_or_else(|| CrmError::structural(format!("{}.section", query.module())))?;

        let sections: Vec<Value> = one_or_many(sections).into_iter().cloned().collect();
        Ok(QueryResult::Other(Value::Array(sections)))
    }
}
