pub mod contact;
pub mod definition;
pub mod entity;

pub use definition::{pluralize, AliasTable, EntityDeclaration, EntityDefinition};
pub use entity::Entity;

use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Entity definitions indexed by the module they map to.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    by_module: HashMap<String, Arc<EntityDefinition>>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_entities() -> Result<Self> {
        let mut catalog = Self::new();
        catalog.register(contact::definition()?);
        Ok(catalog)
    }

    pub fn register(&mut self, definition: EntityDefinition) {
        self.by_module
            .insert(definition.module_name(), Arc::new(definition));
    }

    pub fn for_module(&self, module: &str) -> Option<Arc<EntityDefinition>> {
        self.by_module.get(module).cloned()
    }

    /// Declared definition, or a bare one named after the module when none is declared.
    pub fn for_module_or_bare(&self, module: &str) -> Arc<EntityDefinition> {
        self.for_module(module).unwrap_or_else(|| {
            tracing::debug!("No entity declared for module {}, using raw field names only", module);
            Arc::new(EntityDefinition::new(module, AliasTable::default()).with_module_name(module))
        })
    }
}
