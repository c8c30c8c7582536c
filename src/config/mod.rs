pub mod toml_config;

pub use toml_config::ClientConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "crm-records")]
#[command(about = "Run one CRM API query and print the normalized result")]
pub struct CliConfig {
    #[arg(long, default_value = "crm.toml")]
    pub config: String,

    #[arg(long, help = "Module to query, e.g. Contacts")]
    pub module: String,

    #[arg(long, default_value = "getRecords", help = "API method, e.g. getDeletedRecordIds")]
    pub method: String,

    #[arg(long = "param", value_parser = parse_param, help = "Extra query parameter as key=value")]
    pub params: Vec<(String, String)>,

    #[arg(long, help = "Only records modified after this time (YYYY-MM-DD HH:MM:SS)")]
    pub since: Option<String>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: crate::app::report::OutputFormat,

    #[arg(long, help = "Key record fields by their raw API names instead of aliases")]
    pub raw: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got \"{}\"", s))
}
