//! HTTP implementation of the enrichment source.

use std::time::Duration;

use async_trait::async_trait;

use relist_core::repair::RepairCandidate;

use crate::{EnrichmentError, EnrichmentSource};

/// Default request timeout for enrichment calls.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the enrichment HTTP client.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Base URL of the enrichment API (default: `http://localhost:9050`).
    pub base_url: String,
    /// Optional bearer token sent with every request.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (default: `10`).
    pub request_timeout_secs: u64,
}

impl EnrichmentConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `ENRICHMENT_API_URL`      | `http://localhost:9050`  |
    /// | `ENRICHMENT_API_KEY`      | unset                    |
    /// | `ENRICHMENT_TIMEOUT_SECS` | `10`                     |
    pub fn from_env() -> Self {
        let base_url = std::env::var("ENRICHMENT_API_URL")
            .unwrap_or_else(|_| "http://localhost:9050".into());

        let api_key = std::env::var("ENRICHMENT_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let request_timeout_secs: u64 = std::env::var("ENRICHMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("ENRICHMENT_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_key,
            request_timeout_secs,
        }
    }
}

/// Enrichment client speaking the upstream HTTP API.
///
/// Holds the configuration and a pooled [`reqwest::Client`]; one
/// instance is shared across the whole process via `AppState`.
pub struct HttpEnrichmentClient {
    config: EnrichmentConfig,
    http: reqwest::Client,
}

impl HttpEnrichmentClient {
    /// Build a client with the per-request timeout from `config`.
    pub fn new(config: EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Base URL of the upstream API.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the field-fetch URL for one item.
    fn fields_url(&self, item_id: &str) -> String {
        format!(
            "{}/items/{item_id}/fields",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl EnrichmentSource for HttpEnrichmentClient {
    async fn fetch_missing_fields(
        &self,
        item_id: &str,
    ) -> Result<RepairCandidate, EnrichmentError> {
        let url = self.fields_url(item_id);

        let mut request = self.http.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::ItemNotFound {
                item_id: item_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(EnrichmentError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        let candidate = response
            .json::<RepairCandidate>()
            .await
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        tracing::debug!(item_id, url = %url, "Fetched enrichment candidate");
        Ok(candidate)
    }
}
