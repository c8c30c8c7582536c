use crate::utils::error::{CrmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Clean (public) name to raw (wire) field name, one-to-one.
///
/// Built once per entity type. Construction fails if a clean name is declared
/// twice or two clean names point at the same raw field, so lookups in both
/// directions are unambiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
    reverse: HashMap<String, String>,
}

impl AliasTable {
    pub fn new<I, A, R>(entity: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, R)>,
        A: Into<String>,
        R: Into<String>,
    {
        let mut aliases: BTreeMap<String, String> = BTreeMap::new();
        for (alias, raw) in pairs {
            let (alias, raw): (String, String) = (alias.into(), raw.into());
            if let Some(existing) = aliases.get(&alias) {
                return Err(CrmError::DuplicateAlias {
                    entity: entity.to_string(),
                    alias,
                    raw_names: vec![existing.clone(), raw],
                });
            }
            aliases.insert(alias, raw);
        }

        let mut reverse: HashMap<String, String> = HashMap::with_capacity(aliases.len());
        for (alias, raw) in &aliases {
            if reverse.contains_key(raw) {
                let clashing: Vec<String> = aliases
                    .iter()
                    .filter(|(_, r)| *r == raw)
                    .map(|(a, _)| a.clone())
                    .collect();
                return Err(CrmError::MalformedAliasTable {
                    entity: entity.to_string(),
                    raw: raw.clone(),
                    aliases: clashing,
                });
            }
            reverse.insert(raw.clone(), alias.clone());
        }

        Ok(Self { aliases, reverse })
    }

    pub fn raw_name(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn alias_of(&self, raw: &str) -> Option<&str> {
        self.reverse.get(raw).map(String::as_str)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn has_alias(&self, raw: &str) -> bool {
        self.reverse.contains_key(raw)
    }

    /// Alias if `name` is one, otherwise `name` unchanged.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.raw_name(name).unwrap_or(name)
    }

    /// Pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, r)| (a.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Declarative description of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinition {
    name: String,
    module_name: Option<String>,
    primary_key: Option<String>,
    aliases: AliasTable,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>, aliases: AliasTable) -> Self {
        Self {
            name: name.into(),
            module_name: None,
            primary_key: None,
            aliases,
        }
    }

    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    /// Overrides the module's declared primary key for this entity type.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit module name, or the pluralized entity name.
    pub fn module_name(&self) -> String {
        self.module_name
            .clone()
            .unwrap_or_else(|| pluralize(&self.name))
    }

    pub fn primary_key_override(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }
}

/// Plain-data form of [`EntityDefinition`], as written in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDeclaration {
    pub name: String,
    pub module: Option<String>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl TryFrom<&EntityDeclaration> for EntityDefinition {
    type Error = CrmError;

    fn try_from(declaration: &EntityDeclaration) -> Result<Self> {
        let aliases = AliasTable::new(&declaration.name, declaration.aliases.clone())?;
        let mut definition = EntityDefinition::new(declaration.name.clone(), aliases);
        if let Some(module) = &declaration.module {
            definition = definition.with_module_name(module.clone());
        }
        if let Some(primary_key) = &declaration.primary_key {
            definition = definition.with_primary_key(primary_key.clone());
        }
        Ok(definition)
    }
}

/// English plural for record type names: `Contact` -> `Contacts`,
/// `Opportunity` -> `Opportunities`, `Address` -> `Addresses`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_ascii_lowercase();
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }

    let mut chars = lower.chars().rev();
    if let (Some('y'), Some(before)) = (chars.next(), chars.next()) {
        if !matches!(before, 'a' | 'e' | 'i' | 'o' | 'u') {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    format!("{word}s")
}
