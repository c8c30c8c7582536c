use crate::config::ClientConfig;
use crate::domain::model::Query;
use crate::domain::ports::Transport;
use crate::utils::error::{CrmError, Result};
use async_trait::async_trait;
use std::time::Duration;

const RESPONSE_FORMAT: &str = "json";

/// `reqwest`-backed transport for `{endpoint}/json/{Module}/{method}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    auth_token: String,
    scope: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
            scope: "crmapi".to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().to_string(),
            auth_token: config.auth_token().to_string(),
            scope: config.scope().to_string(),
        })
    }

    pub fn url_for(&self, query: &Query) -> String {
        format!(
            "{}/{}/{}/{}",
            self.endpoint,
            RESPONSE_FORMAT,
            query.module(),
            query.method()
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, query: &Query) -> Result<serde_json::Value> {
        let url = self.url_for(query);
        tracing::debug!("Making API request to: {}", url);

        let mut params: Vec<(&str, &str)> = vec![
            ("authtoken", self.auth_token.as_str()),
            ("scope", self.scope.as_str()),
        ];
        params.extend(query.params().iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(CrmError::ApiResponse {
                code: status.as_u16().to_string(),
                message: status
                    .canonical_reason()
                    .unwrap_or("HTTP error")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
