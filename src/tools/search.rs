//! Web search demo plugin
//!
//! Thin wrapper over a Bing-style custom search endpoint. Returns the
//! result snippets as plain text for the model to quote from.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::core::config::SearchConfig;
use crate::core::{RedraftError, Result};

/// Web search client
pub struct WebSearch {
    client: Client,
    endpoint: String,
    custom_config_id: String,
    subscription_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

impl WebSearch {
    /// Create a search client; the key comes from the environment only
    pub fn new(config: &SearchConfig, subscription_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: config.endpoint.clone(),
            custom_config_id: config.custom_config_id.clone(),
            subscription_key,
        }
    }

    /// Perform a web search and return the joined result snippets
    pub async fn search(&self, query: &str) -> Result<String> {
        let key = self.subscription_key.as_deref().ok_or_else(|| {
            RedraftError::tool(
                "search subscription key not configured (set REDRAFT_SEARCH_KEY)",
            )
        })?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("customconfig", &self.custom_config_id)])
            .header("Ocp-Apim-Subscription-Key", key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RedraftError::tool(format!(
                "search request failed: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let results = body
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default();

        if results.is_empty() {
            return Ok("No results found.".to_string());
        }

        Ok(results
            .iter()
            .map(|page| format!("{} ({})\n{}", page.name, page.url, page.snippet))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "webPages": {
                "value": [
                    { "name": "Cats", "url": "https://example.com/cats", "snippet": "All about cats." }
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let pages = parsed.web_pages.unwrap().value;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].snippet, "All about cats.");
    }

    #[test]
    fn test_missing_web_pages_section() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.web_pages.is_none());
    }

    #[tokio::test]
    async fn test_search_without_key_fails() {
        let search = WebSearch::new(&SearchConfig::default(), None);
        let err = search.search("anything").await.unwrap_err();
        assert!(err.to_string().contains("REDRAFT_SEARCH_KEY"));
    }
}
