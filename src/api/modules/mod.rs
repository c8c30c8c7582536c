pub mod contacts;

use crate::domain::model::Method;
use crate::domain::ports::ClientContext;
use crate::utils::error::{CrmError, Result};
use std::collections::{BTreeSet, HashMap};

/// What a CRM module exposes: its primary-key field and the methods it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: String,
    primary_key: String,
    supported_methods: BTreeSet<Method>,
}

impl ModuleDescriptor {
    pub fn new(
        name: impl Into<String>,
        primary_key: impl Into<String>,
        methods: impl IntoIterator<Item = Method>,
    ) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            supported_methods: methods.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    pub fn supported_methods(&self) -> &BTreeSet<Method> {
        &self.supported_methods
    }

    pub fn supports(&self, method: Method) -> bool {
        self.supported_methods.contains(&method)
    }

    pub fn ensure_supports(&self, method: Method) -> Result<()> {
        if self.supports(method) {
            Ok(())
        } else {
            Err(CrmError::UnsupportedMethod {
                module: self.name.clone(),
                method: method.to_string(),
            })
        }
    }
}

/// Name-indexed set of module descriptors. This is the context entities attach to.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the modules this crate ships descriptors for.
    pub fn with_builtin_modules() -> Self {
        let mut registry = Self::new();
        registry.register(contacts::descriptor());
        registry
    }

    /// Adds or replaces the descriptor registered under the same name.
    pub fn register(&mut self, descriptor: ModuleDescriptor) {
        if self.modules.contains_key(descriptor.name()) {
            tracing::debug!("Replacing module descriptor for {}", descriptor.name());
        }
        self.modules.insert(descriptor.name().to_string(), descriptor);
    }

    pub fn get(&self, name: &str) -> Result<&ModuleDescriptor> {
        self.modules.get(name).ok_or_else(|| CrmError::UnknownModule {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ClientContext for ModuleRegistry {
    fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }
}
