use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

mod error;
mod http;

pub use error::SuggestionError;
pub use http::HttpSuggestionClient;

use crate::config::SuggestConfig;
use crate::model::Suggestion;

/// Request body sent to the suggestion service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest<'a> {
    pub task_description: &'a str,
}

#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, task_description: &str) -> Result<Suggestion, SuggestionError>;
}

/// Client used when no endpoint is configured; every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredClient;

#[async_trait]
impl SuggestionClient for UnconfiguredClient {
    async fn suggest(&self, _task_description: &str) -> Result<Suggestion, SuggestionError> {
        Err(SuggestionError::NotConfigured)
    }
}

/// Create a suggestion client from config.
///
/// Falls back to [`UnconfiguredClient`] when no endpoint is set.
pub fn client_from_config(config: &SuggestConfig) -> Result<Arc<dyn SuggestionClient>, SuggestionError> {
    match config.endpoint.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => {
            debug!(%endpoint, "client_from_config: using HTTP client");
            Ok(Arc::new(HttpSuggestionClient::from_config(config)?))
        }
        _ => {
            debug!("client_from_config: no endpoint, suggestions disabled");
            Ok(Arc::new(UnconfiguredClient))
        }
    }
}
