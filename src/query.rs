//! Read queries against the REST data API.
//!
//! Only the subset needed by the application is modelled: column selection,
//! equality filters and a row limit.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::client::ClientHandle;

/// Error body returned by the data API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ServiceError {
    /// Decode an error response body, falling back to the raw text
    pub fn from_body(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<ServiceError>(body) {
            Ok(err) if !err.message.is_empty() => err,
            _ => {
                let message = if body.trim().is_empty() {
                    format!("HTTP {}", http_status)
                } else {
                    body.trim().to_string()
                };
                ServiceError {
                    message,
                    ..Default::default()
                }
            }
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Failure of a data API request
#[derive(Debug, Error)]
pub enum QueryError {
    /// The service answered with an error status
    #[error("{error}")]
    Service { status: u16, error: ServiceError },
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The configured base URL cannot address the endpoint
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl QueryError {
    /// Human-readable message, without the status wrapper for service errors
    pub fn message(&self) -> String {
        match self {
            QueryError::Service { error, .. } => error.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Read query on a single table
#[derive(Debug, Clone)]
pub struct TableQuery {
    client: ClientHandle,
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    limit: Option<usize>,
}

impl TableQuery {
    pub(crate) fn new(client: ClientHandle, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Comma-separated list of columns to return
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Keep rows where `column` equals `value`
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Return at most `count` rows
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Query pairs in the order they are sent
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().cloned());
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Run the query and return the matching rows
    pub async fn execute(self) -> Result<Vec<serde_json::Value>, QueryError> {
        let mut url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());

        debug!("=== Query Request ===");
        debug!("URL: {}", url);

        let response = self.client.request(reqwest::Method::GET, url).send().await?;

        let status = response.status();
        debug!("=== Query Response ===");
        debug!("Status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(QueryError::Service {
                status: status.as_u16(),
                error: ServiceError::from_body(status.as_u16(), &body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
