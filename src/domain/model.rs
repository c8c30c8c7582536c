use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{CrmError, Result};

/// Timestamp layout used by the CRM for both parameters and field values.
pub const CRM_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One record as it came off the wire, keyed by raw field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// Shape a method's normalized payload takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDataType {
    Records,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "getFields")]
    GetFields,
    #[serde(rename = "getRecordById")]
    GetRecordById,
    #[serde(rename = "getRecords")]
    GetRecords,
    #[serde(rename = "getMyRecords")]
    GetMyRecords,
    #[serde(rename = "searchRecords")]
    SearchRecords,
    #[serde(rename = "insertRecords")]
    InsertRecords,
    #[serde(rename = "updateRecords")]
    UpdateRecords,
    #[serde(rename = "getDeletedRecordIds")]
    GetDeletedRecordIds,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::GetFields,
        Method::GetRecordById,
        Method::GetRecords,
        Method::GetMyRecords,
        Method::SearchRecords,
        Method::InsertRecords,
        Method::UpdateRecords,
        Method::GetDeletedRecordIds,
    ];

    /// Name used in request URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetFields => "getFields",
            Method::GetRecordById => "getRecordById",
            Method::GetRecords => "getRecords",
            Method::GetMyRecords => "getMyRecords",
            Method::SearchRecords => "searchRecords",
            Method::InsertRecords => "insertRecords",
            Method::UpdateRecords => "updateRecords",
            Method::GetDeletedRecordIds => "getDeletedRecordIds",
        }
    }

    pub fn response_type(&self) -> ResponseDataType {
        match self {
            Method::GetRecordById
            | Method::GetRecords
            | Method::GetMyRecords
            | Method::SearchRecords
            | Method::InsertRecords
            | Method::UpdateRecords => ResponseDataType::Records,
            Method::GetFields | Method::GetDeletedRecordIds => ResponseDataType::Other,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CrmError::InvalidConfigValueError {
                field: "method".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown method. Valid methods: {}",
                    Method::ALL.map(|m| m.as_str()).join(", ")
                ),
            })
    }
}

/// A single API call: which method, on which module, with which parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    method: Method,
    module: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(method: Method, module: impl Into<String>) -> Self {
        Self {
            method,
            module: module.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn modified_since(self, since: NaiveDateTime) -> Self {
        let formatted = since.format(CRM_DATETIME_FORMAT).to_string();
        self.param("lastModifiedTime", formatted)
    }

    /// Inclusive, 1-based index range.
    pub fn page(self, from_index: u32, to_index: u32) -> Self {
        self.param("fromIndex", from_index.to_string())
            .param("toIndex", to_index.to_string())
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Normalized outcome of one response.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// The API answered but had nothing to return.
    NoData,
    Records(Vec<Record>),
    Ids(Vec<String>),
    Other(serde_json::Value),
}

impl QueryResult {
    pub fn is_no_data(&self) -> bool {
        matches!(self, QueryResult::NoData)
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::NoData => 0,
            QueryResult::Records(records) => records.len(),
            QueryResult::Ids(ids) => ids.len(),
            QueryResult::Other(serde_json::Value::Array(items)) => items.len(),
            QueryResult::Other(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
