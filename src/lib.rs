pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod entities;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpTransport;
pub use api::modules::{ModuleDescriptor, ModuleRegistry};
pub use config::ClientConfig;
pub use crate::core::{Client, ClientContext, Method, Query, QueryResult, Record, ResponseInterpreter, Transport};
pub use entities::{AliasTable, Entity, EntityCatalog, EntityDefinition};
pub use utils::error::{CrmError, Result};
