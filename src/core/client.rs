use crate::api::methods;
use crate::api::modules::ModuleRegistry;
use crate::domain::model::{Method, Query, QueryResult, Record, ResponseDataType};
use crate::domain::ports::{ClientContext, Transport};
use crate::entities::{Entity, EntityCatalog};
use crate::utils::error::{CrmError, Result};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::sync::Arc;

/// Issues queries one at a time and turns the answers into entities.
///
/// Entities it hands out are attached to its module registry, so `key()` and
/// friends work on them without further setup.
pub struct Client<T: Transport> {
    transport: T,
    modules: Arc<ModuleRegistry>,
    entities: EntityCatalog,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, modules: ModuleRegistry, entities: EntityCatalog) -> Self {
        Self {
            transport,
            modules: Arc::new(modules),
            entities,
        }
    }

    pub fn with_builtins(transport: T) -> Result<Self> {
        Ok(Self::new(
            transport,
            ModuleRegistry::with_builtin_modules(),
            EntityCatalog::with_builtin_entities()?,
        ))
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn entity_catalog(&self) -> &EntityCatalog {
        &self.entities
    }

    /// Handle to attach entities to this client.
    pub fn context(&self) -> Arc<dyn ClientContext> {
        self.modules.clone()
    }

    /// Fetches and normalizes one query.
    pub async fn execute(&self, query: &Query) -> Result<QueryResult> {
        self.modules
            .get(query.module())?
            .ensure_supports(query.method())?;

        tracing::debug!("Executing {} on {}", query.method(), query.module());
        let response = self.transport.fetch(query).await?;
        methods::interpret(&response, query)
    }

    /// Runs a record-returning query. `None` when the API reported no data.
    pub async fn fetch_entities(&self, query: &Query) -> Result<Option<Vec<Entity>>> {
        if query.method().response_type() != ResponseDataType::Records {
            return Err(CrmError::UnsupportedMethod {
                module: query.module().to_string(),
                method: format!("{} (does not return records)", query.method()),
            });
        }

        match self.execute(query).await? {
            QueryResult::NoData => Ok(None),
            QueryResult::Records(records) => Ok(Some(self.wrap_records(query.module(), records))),
            _ => Err(CrmError::structural(format!(
                "response.result.{}.row",
                query.module()
            ))),
        }
    }

    pub fn wrap_records(&self, module: &str, records: Vec<Record>) -> Vec<Entity> {
        let definition = self.entities.for_module_or_bare(module);
        records
            .into_iter()
            .map(|record| Entity::from_record(definition.clone(), record, Some(self.context())))
            .collect()
    }

    /// Ids deleted in `module`, optionally only since a point in time. Empty when none.
    pub async fn deleted_record_ids(
        &self,
        module: &str,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<String>> {
        let mut query = Query::new(Method::GetDeletedRecordIds, module);
        if let Some(since) = since {
            query = query.modified_since(since);
        }

        match self.execute(&query).await? {
            QueryResult::NoData => Ok(Vec::new()),
            QueryResult::Ids(ids) => {
                tracing::info!("{} deleted record id(s) in {}", ids.len(), module);
                Ok(ids)
            }
            _ => Err(CrmError::structural("response.result.DeletedIDs")),
        }
    }

    pub async fn record_by_id(&self, module: &str, id: &str) -> Result<Option<Entity>> {
        let query = Query::new(Method::GetRecordById, module).param("id", id);
        let entities = self.fetch_entities(&query).await?;
        Ok(entities.and_then(|entities| entities.into_iter().next()))
    }

    /// Fetches a fresh copy of `entity` by its primary key.
    pub async fn refetch(&self, entity: &Entity) -> Result<Option<Entity>> {
        let module = entity.module()?.name().to_string();
        let id = match entity.key()? {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => {
                return Err(CrmError::MissingKey {
                    entity: entity.name().to_string(),
                })
            }
        };
        self.record_by_id(&module, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedTransport {
        body: Value,
        seen: Mutex<Vec<Query>>,
    }

    impl CannedTransport {
        fn new(body: Value) -> Self {
            Self {
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn fetch(&self, query: &Query) -> Result<Value> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.body.clone())
        }
    }

    #[tokio::test]
    async fn test_deleted_ids_sentinel_is_empty() {
        let client = Client::with_builtins(CannedTransport::new(
            json!({"response": {"result": {"DeletedIDs": true}}}),
        ))
        .unwrap();

        let ids = client.deleted_record_ids("Contacts", None).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected_before_fetch() {
        let mut modules = ModuleRegistry::new();
        modules.register(crate::api::modules::ModuleDescriptor::new(
            "Leads",
            "LEADID",
            [Method::GetRecords],
        ));
        let client = Client::new(
            CannedTransport::new(json!({})),
            modules,
            EntityCatalog::new(),
        );

        let result = client.deleted_record_ids("Leads", None).await;
        assert!(matches!(result, Err(CrmError::UnsupportedMethod { .. })));
        assert!(client.transport.seen.lock().unwrap().is_empty());

        let unknown = client.execute(&Query::new(Method::GetRecords, "Deals")).await;
        assert!(matches!(unknown, Err(CrmError::UnknownModule { .. })));
    }

    #[tokio::test]
    async fn test_fetched_entities_are_attached() {
        let client = Client::with_builtins(CannedTransport::new(json!({"response": {"result": {"Contacts": {"row": {
            "no": "1",
            "FL": [
                {"val": "CONTACTID", "content": "1001"},
                {"val": "Email", "content": "ada@example.com"}
            ]
        }}}}})))
        .unwrap();

        let entity = client.record_by_id("Contacts", "1001").await.unwrap().unwrap();
        assert_eq!(entity.name(), "Contact");
        assert!(!entity.is_detached());
        assert_eq!(entity.key().unwrap(), Some(&json!("1001")));
        assert_eq!(entity.get("email"), Some(&json!("ada@example.com")));

        let seen = client.transport.seen.lock().unwrap();
        assert_eq!(seen[0].get_param("id"), Some("1001"));
    }

    #[tokio::test]
    async fn test_refetch_requires_attached_entity() {
        let client = Client::with_builtins(CannedTransport::new(json!({}))).unwrap();
        let definition = client.entity_catalog().for_module("Contacts").unwrap();
        let entity = Entity::new(definition, [("id", json!("1001"))], None);

        assert!(matches!(
            client.refetch(&entity).await,
            Err(CrmError::DetachedEntity { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_entities_rejects_non_record_methods() {
        let client = Client::with_builtins(CannedTransport::new(json!({}))).unwrap();
        let query = Query::new(Method::GetDeletedRecordIds, "Contacts");
        assert!(client.fetch_entities(&query).await.is_err());
    }
}
