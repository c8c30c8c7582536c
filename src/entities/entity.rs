use crate::api::modules::ModuleDescriptor;
use crate::domain::model::{Record, CRM_DATETIME_FORMAT};
use crate::domain::ports::ClientContext;
use crate::entities::definition::EntityDefinition;
use crate::utils::error::{CrmError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One CRM record with alias-aware access to its fields.
///
/// Properties are always stored under their raw names; aliases are only
/// translated on the way in and out. Values are flat JSON scalars, which is
/// what makes [`Entity::copy`] a full duplicate.
#[derive(Clone)]
pub struct Entity {
    definition: Arc<EntityDefinition>,
    properties: HashMap<String, Value>,
    context: Option<Arc<dyn ClientContext>>,
}

impl Entity {
    pub fn new<I, K>(
        definition: Arc<EntityDefinition>,
        data: I,
        context: Option<Arc<dyn ClientContext>>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let properties = data
            .into_iter()
            .map(|(name, value)| (definition.aliases().resolve(name.as_ref()).to_string(), value))
            .collect();

        Self {
            definition,
            properties,
            context,
        }
    }

    /// Empty, context-less entity.
    pub fn detached(definition: Arc<EntityDefinition>) -> Self {
        Self::new(definition, Vec::<(String, Value)>::new(), None)
    }

    pub fn from_record(
        definition: Arc<EntityDefinition>,
        record: Record,
        context: Option<Arc<dyn ClientContext>>,
    ) -> Self {
        Self::new(definition, record.data, context)
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &EntityDefinition {
        &self.definition
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Value stored under `name` (alias or raw). Null counts as unset.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let raw = self.definition.aliases().resolve(name);
        self.properties.get(raw).filter(|value| !value.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Parses a CRM timestamp (`2024-05-02 10:11:12`). Unparseable values read as unset.
    pub fn get_datetime(&self, name: &str) -> Option<NaiveDateTime> {
        let text = self.get_str(name)?;
        match NaiveDateTime::parse_from_str(text, CRM_DATETIME_FORMAT) {
            Ok(datetime) => Some(datetime),
            Err(e) => {
                tracing::warn!("{}.{} is not a CRM timestamp ({}): {}", self.name(), name, text, e);
                None
            }
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let raw = self.definition.aliases().resolve(name).to_string();
        self.properties.insert(raw, value.into());
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.definition.aliases().is_alias(name)
    }

    pub fn has_alias(&self, raw: &str) -> bool {
        self.definition.aliases().has_alias(raw)
    }

    /// Read restricted to declared aliases.
    pub fn alias_get(&self, alias: &str) -> Result<Option<&Value>> {
        let raw = self.raw_name_for_alias(alias)?;
        Ok(self.properties.get(raw).filter(|value| !value.is_null()))
    }

    /// Write restricted to declared aliases.
    pub fn alias_set(&mut self, alias: &str, value: impl Into<Value>) -> Result<()> {
        let raw = self.raw_name_for_alias(alias)?.to_string();
        self.properties.insert(raw, value.into());
        Ok(())
    }

    fn raw_name_for_alias(&self, alias: &str) -> Result<&str> {
        self.definition
            .aliases()
            .raw_name(alias)
            .ok_or_else(|| CrmError::unsupported_property(self.name(), alias))
    }

    pub fn to_raw_map(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    pub fn into_raw_map(self) -> HashMap<String, Value> {
        self.properties
    }

    /// Aliased properties that are present, keyed by alias. Unaliased fields are left out.
    pub fn to_alias_map(&self) -> BTreeMap<String, Value> {
        self.definition
            .aliases()
            .iter()
            .filter_map(|(alias, raw)| {
                self.properties
                    .get(raw)
                    .map(|value| (alias.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn to_record(&self) -> Record {
        Record {
            data: self.properties.clone(),
        }
    }

    pub fn context(&self) -> Option<&Arc<dyn ClientContext>> {
        self.context.as_ref()
    }

    pub fn set_context(&mut self, context: Option<Arc<dyn ClientContext>>) {
        self.context = context;
    }

    pub fn is_detached(&self) -> bool {
        self.context.is_none()
    }

    /// Descriptor of the module this entity belongs to, looked up through its context.
    pub fn module(&self) -> Result<&ModuleDescriptor> {
        let context = self.context.as_deref().ok_or_else(|| CrmError::DetachedEntity {
            entity: self.name().to_string(),
        })?;
        let module_name = self.definition.module_name();
        context
            .module(&module_name)
            .ok_or(CrmError::UnknownModule { name: module_name })
    }

    /// Primary-key value. Requires an attached context even when the definition
    /// overrides the key name, since the key is only meaningful for a known module.
    pub fn key(&self) -> Result<Option<&Value>> {
        let module = self.module()?;
        let primary_key = self
            .definition
            .primary_key_override()
            .unwrap_or_else(|| module.primary_key_name());
        Ok(self.get(primary_key))
    }

    /// Independent property map, same context handle.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Rebuilds a detached entity from the output of its `Serialize` impl.
    pub fn deserialize_with<'de, D>(
        definition: Arc<EntityDefinition>,
        deserializer: D,
    ) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let properties = HashMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::new(definition, properties, None))
    }

    pub fn from_json(definition: Arc<EntityDefinition>, json: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let entity = Self::deserialize_with(definition, &mut deserializer)?;
        deserializer.end()?;
        Ok(entity)
    }
}

/// Only the raw property map is written; the context never crosses a
/// serialization boundary.
impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ordered: BTreeMap<&String, &Value> = self.properties.iter().collect();
        ordered.serialize(serializer)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name())
            .field("properties", &self.properties)
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "{} {}", self.name(), json)
    }
}
