use chrono::NaiveDateTime;
use clap::Parser;
use crm_records::app::report::{self, KeyStyle};
use crm_records::domain::model::CRM_DATETIME_FORMAT;
use crm_records::utils::error::ErrorSeverity;
use crm_records::utils::{logger, validation::Validate};
use crm_records::{Client, ClientConfig, CliConfig, CrmError, HttpTransport, Method, Query, QueryResult};

async fn run(cli: &CliConfig) -> crm_records::Result<String> {
    let config = ClientConfig::from_file(&cli.config)?;
    config.validate()?;

    let method: Method = cli.method.parse()?;
    let mut query = Query::new(method, cli.module.clone());
    if let Some(since) = &cli.since {
        let since = NaiveDateTime::parse_from_str(since, CRM_DATETIME_FORMAT).map_err(|e| {
            CrmError::InvalidConfigValueError {
                field: "since".to_string(),
                value: since.clone(),
                reason: e.to_string(),
            }
        })?;
        query = query.modified_since(since);
    }
    for (key, value) in &cli.params {
        query = query.param(key.clone(), value.clone());
    }

    let transport = HttpTransport::from_config(&config)?;
    let client = Client::new(transport, config.module_registry(), config.entity_catalog()?);

    tracing::info!("Running {} on {}", query.method(), query.module());
    let result = client.execute(&query).await?;
    let entities = match &result {
        QueryResult::Records(records) => client.wrap_records(query.module(), records.clone()),
        _ => Vec::new(),
    };
    tracing::info!("Received {} item(s)", result.len());

    let keys = if cli.raw { KeyStyle::Raw } else { KeyStyle::Alias };
    report::render(&result, &entities, cli.format, keys)
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    match run(&cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Query failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}
