use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Entity {entity} has no aliased property named \"{property}\"")]
    UnsupportedProperty { entity: String, property: String },

    #[error("Entity {entity} is detached from any client, its module cannot be resolved")]
    DetachedEntity { entity: String },

    #[error("Entity {entity} has no primary-key value")]
    MissingKey { entity: String },

    #[error("Unknown module: {name}")]
    UnknownModule { name: String },

    #[error("Module {module} does not support method {method}")]
    UnsupportedMethod { module: String, method: String },

    #[error("Unexpected response structure: missing or invalid \"{path}\"")]
    StructuralResponse { path: String },

    #[error("Entity {entity} declares several aliases ({}) for raw field \"{raw}\"", .aliases.join(", "))]
    MalformedAliasTable {
        entity: String,
        raw: String,
        aliases: Vec<String>,
    },

    #[error("Entity {entity} declares alias \"{alias}\" more than once ({})", .raw_names.join(", "))]
    DuplicateAlias {
        entity: String,
        alias: String,
        raw_names: Vec<String>,
    },

    #[error("API returned error {code}: {message}")]
    ApiResponse { code: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value \"{value}\" for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Entity,
    Response,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrmError {
    pub fn structural(path: impl Into<String>) -> Self {
        Self::StructuralResponse { path: path.into() }
    }

    pub fn unsupported_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnsupportedProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedProperty { .. }
            | Self::DetachedEntity { .. }
            | Self::MissingKey { .. }
            | Self::MalformedAliasTable { .. }
            | Self::DuplicateAlias { .. } => ErrorCategory::Entity,
            Self::UnknownModule { .. }
            | Self::UnsupportedMethod { .. }
            | Self::StructuralResponse { .. }
            | Self::ApiResponse { .. } => ErrorCategory::Response,
            Self::ApiError(_) => ErrorCategory::Network,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedProperty { .. }
            | Self::DetachedEntity { .. }
            | Self::MissingKey { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::ApiResponse { .. } => ErrorSeverity::Medium,
            Self::UnknownModule { .. }
            | Self::UnsupportedMethod { .. }
            | Self::MalformedAliasTable { .. }
            | Self::DuplicateAlias { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::StructuralResponse { .. } | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Entity => {
                "Use a declared alias or the raw field name, and attach the entity to a client"
            }
            ErrorCategory::Response => {
                "Check the module and method names; the API response format may have changed"
            }
            ErrorCategory::Network => "Check network connectivity and the API endpoint, then retry",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => "The CRM API did not answer in time".to_string(),
            Self::ApiError(e) if e.is_connect() => "Could not connect to the CRM API".to_string(),
            Self::ApiResponse { code, message } => format!("The CRM API refused the request ({code}): {message}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_property_names_entity_and_property() {
        let err = CrmError::unsupported_property("Contact", "nickname");
        let message = err.to_string();
        assert!(message.contains("Contact"));
        assert!(message.contains("nickname"));
        assert_eq!(err.category(), ErrorCategory::Entity);
    }

    #[test]
    fn test_structural_error_is_critical() {
        let err = CrmError::structural("response");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("\"response\""));
    }

    #[test]
    fn test_malformed_alias_table_lists_aliases() {
        let err = CrmError::MalformedAliasTable {
            entity: "Contact".to_string(),
            raw: "Email".to_string(),
            aliases: vec!["email".to_string(), "mail".to_string()],
        };
        assert!(err.to_string().contains("email, mail"));
    }

    #[test]
    fn test_duplicate_alias_names_both_raw_fields() {
        let err = CrmError::DuplicateAlias {
            entity: "Contact".to_string(),
            alias: "email".to_string(),
            raw_names: vec!["Email".to_string(), "EMAIL_2".to_string()],
        };
        assert!(err.to_string().contains("Email, EMAIL_2"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
