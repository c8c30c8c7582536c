use crate::api::modules::ModuleDescriptor;
use crate::domain::model::{Query, QueryResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Whatever an entity is attached to. Resolves module descriptors by name.
pub trait ClientContext: Send + Sync {
    fn module(&self, name: &str) -> Option<&ModuleDescriptor>;
}

/// Classifies and normalizes the decoded body of one response.
///
/// `normalize` is only defined for responses where `has_data` returned true.
pub trait ResponseInterpreter: Send + Sync {
    fn has_data(&self, response: &serde_json::Value, query: &Query) -> Result<bool>;
    fn normalize(&self, response: &serde_json::Value, query: &Query) -> Result<QueryResult>;
}

/// Executes a query against the remote API and returns the decoded body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, query: &Query) -> Result<serde_json::Value>;
}
