use crate::pagination::SearchPage;
use crate::ports::CatalogSource;
use crate::query::SearchRequest;
use async_trait::async_trait;
use infrarisk_core::config::CatalogConfig;
use infrarisk_core::{InfraRiskError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Longest slice of an error body kept in error messages
const ERROR_BODY_LIMIT: usize = 200;

/// GraphQL catalog client over HTTP
pub struct HttpCatalog {
    /// GraphQL endpoint (e.g., "https://www.mlit-data.jp/api/v1/")
    endpoint: String,

    /// Key sent in the `apikey` header
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpCatalog {
    /// Create a new catalog client
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), api_key: api_key.into(), client: reqwest::Client::new() }
    }

    /// Create from configuration; the API key is required
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InfraRiskError::ConfigMissing { key: "api_key".to_string() })?;
        Ok(Self::new(config.endpoint.clone(), api_key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| InfraRiskError::Catalog {
                reason: format!("Failed to reach catalog at {}: {}", self.endpoint, e),
            })?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(InfraRiskError::Catalog {
                reason: format!("HTTP {}: {}", status, clip(&error_text)),
            });
        }

        let envelope: GraphqlResponse =
            response.json().await.map_err(|e| InfraRiskError::Catalog {
                reason: format!("Failed to parse catalog response: {}", e),
            })?;

        envelope.into_page()
    }

    fn source_name(&self) -> &str {
        &self.endpoint
    }
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    data: Option<SearchData>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    search: Option<SearchPage>,
}

impl GraphqlResponse {
    /// Extract the search page; a GraphQL `errors` member is a failure and a
    /// missing `search` field reads as an empty page
    pub fn into_page(self) -> Result<SearchPage> {
        if let Some(errors) = self.errors.filter(|e| !e.is_null()) {
            return Err(InfraRiskError::Catalog {
                reason: format!("GraphQL error: {}", clip(&errors.to_string())),
            });
        }
        Ok(self.data.and_then(|data| data.search).unwrap_or_default())
    }
}

fn clip(text: &str) -> &str {
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
