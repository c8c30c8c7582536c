use crate::api::modules::{ModuleDescriptor, ModuleRegistry};
use crate::domain::model::Method;
use crate::entities::{EntityCatalog, EntityDeclaration, EntityDefinition};
use crate::utils::error::{CrmError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_SCOPE: &str = "crmapi";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub modules: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub entities: Vec<EntityDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
    pub scope: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    pub name: String,
    pub primary_key: String,
    pub methods: Vec<Method>,
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CrmError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CrmError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CrmError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.endpoint", &self.api.endpoint)?;

        let token = validation::validate_required_field("api.auth_token", &self.api.auth_token)?;
        validation::validate_non_empty_string("api.auth_token", token)?;
        validation::validate_resolved("api.auth_token", token)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        for module in &self.modules {
            validation::validate_non_empty_string("modules.name", &module.name)?;
            validation::validate_non_empty_string("modules.primary_key", &module.primary_key)?;
        }

        for entity in &self.entities {
            validation::validate_non_empty_string("entities.name", &entity.name)?;
            // Builds the alias table, which rejects duplicated raw names.
            EntityDefinition::try_from(entity)?;
        }

        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        self.api.endpoint.trim_end_matches('/')
    }

    pub fn auth_token(&self) -> &str {
        self.api.auth_token.as_deref().unwrap_or_default()
    }

    pub fn scope(&self) -> &str {
        self.api.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Built-in modules plus the declared ones; declarations win on name clashes.
    pub fn module_registry(&self) -> ModuleRegistry {
        let mut registry = ModuleRegistry::with_builtin_modules();
        for module in &self.modules {
            registry.register(ModuleDescriptor::new(
                module.name.clone(),
                module.primary_key.clone(),
                module.methods.iter().copied(),
            ));
        }
        registry
    }

    pub fn entity_catalog(&self) -> Result<EntityCatalog> {
        let mut catalog = EntityCatalog::with_builtin_entities()?;
        for declaration in &self.entities {
            catalog.register(EntityDefinition::try_from(declaration)?);
        }
        Ok(catalog)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ClientContext;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private/"
auth_token = "abc123"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.endpoint(), "https://crm.example.com/crm/private");
        assert_eq!(config.scope(), "crmapi");
        assert_eq!(config.timeout_seconds(), 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CRM_RECORDS_TEST_TOKEN", "from-env");

        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private"
auth_token = "${CRM_RECORDS_TEST_TOKEN}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.auth_token(), "from-env");

        std::env::remove_var("CRM_RECORDS_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_token_fails_validation() {
        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private"
auth_token = "${CRM_RECORDS_SURELY_UNSET_VARIABLE}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[api]
endpoint = "invalid-url"
auth_token = "abc123"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_declared_modules_and_entities() {
        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private"
auth_token = "abc123"

[[modules]]
name = "Leads"
primary_key = "LEADID"
methods = ["getRecords", "getDeletedRecordIds"]

[[entities]]
name = "Lead"
primary_key = "LEADID"

[entities.aliases]
id = "LEADID"
company = "Company"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        config.validate().unwrap();

        let registry = config.module_registry();
        let leads = registry.module("Leads").unwrap();
        assert!(leads.supports(Method::GetDeletedRecordIds));
        assert!(!leads.supports(Method::InsertRecords));
        assert!(registry.module("Contacts").is_some());

        let catalog = config.entity_catalog().unwrap();
        let lead = catalog.for_module("Leads").unwrap();
        assert_eq!(lead.aliases().raw_name("company"), Some("Company"));
    }

    #[test]
    fn test_duplicate_alias_targets_fail_validation() {
        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private"
auth_token = "abc123"

[[entities]]
name = "Lead"

[entities.aliases]
email = "Email"
mail = "Email"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CrmError::MalformedAliasTable { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[api]
endpoint = "https://crm.example.com/crm/private"
auth_token = "abc123"
timeout_seconds = 5
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.timeout_seconds(), 5);
    }
}
