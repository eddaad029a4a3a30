//! Search endpoint client

use serde::Serialize;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::AppError;
use super::extractor;
use super::types::SearchResult;

#[derive(Serialize)]
struct SearchRequest<'a> {
    context: RequestContext<'a>,
    query: &'a str,
    params: &'a str,
}

#[derive(Serialize)]
struct RequestContext<'a> {
    client: ClientIdentity<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientIdentity<'a> {
    client_name: &'a str,
    client_version: &'a str,
}

/// Client for the album/EP search endpoint
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .gzip(true)
            .build()?;
        Ok(Self { http, config })
    }

    /// Issues one search request and returns the downloadable albums/EPs it
    /// lists. An empty vector is a valid answer.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::EmptyQuery);
        }

        tracing::debug!(query = %query, endpoint = %self.config.endpoint, "Search request started");

        let body = SearchRequest {
            context: RequestContext {
                client: ClientIdentity {
                    client_name: &self.config.client_name,
                    client_version: &self.config.client_version,
                },
            },
            query,
            params: &self.config.params,
        };

        let response = self.http.post(&self.config.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Search request rejected");
            return Err(AppError::Transport(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response.bytes().await?;
        let document: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::MalformedResponse(e.to_string()))?;

        let extracted = extractor::extract(&document);
        let total = extracted.len();
        let results: Vec<SearchResult> = extracted
            .into_iter()
            .filter(|result| !result.playlist_id.is_empty())
            .collect();

        if results.len() < total {
            tracing::debug!(dropped = total - results.len(), "Dropped results without a playlist id");
        }
        tracing::info!(query = %query, count = results.len(), "Search request successful");

        Ok(results)
    }
}
