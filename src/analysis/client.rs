//! HTTP client for the analysis endpoint

use std::time::Duration;

use reqwest::Client;

use super::AnalysisDocument;

/// Default analysis document URL on the dashboard backend
pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:8000/analysis.json";

/// Configuration for the analysis client
#[derive(Debug, Clone)]
pub struct AnalysisClientConfig {
    /// URL of the analysis document
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ANALYSIS_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the dashboard's daily analysis document
pub struct AnalysisClient {
    config: AnalysisClientConfig,
    client: Client,
}

impl AnalysisClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalysisClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: AnalysisClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Fetch the current analysis document
    pub async fn fetch(&self) -> anyhow::Result<AnalysisDocument> {
        tracing::debug!(url = %self.config.url, "Fetching analysis document");

        let response = self.client.get(&self.config.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Analysis endpoint error: {} - {}", status, body);
        }

        let document: AnalysisDocument = response.json().await?;

        tracing::debug!(
            assets = document.assets.len(),
            "Fetched analysis document"
        );

        Ok(document)
    }
}

impl Default for AnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}
