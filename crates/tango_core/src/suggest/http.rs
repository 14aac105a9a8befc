use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{SuggestionClient, SuggestionError, SuggestionRequest};
use crate::config::SuggestConfig;
use crate::model::Suggestion;

pub struct HttpSuggestionClient {
    endpoint: String,
    http: Client,
    timeout: Option<Duration>,
}

impl HttpSuggestionClient {
    pub fn new<E: Into<String>>(endpoint: E, timeout: Option<Duration>) -> Result<Self, SuggestionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
            timeout,
        })
    }

    pub fn from_config(config: &SuggestConfig) -> Result<Self, SuggestionError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or(SuggestionError::NotConfigured)?;
        Self::new(endpoint, config.timeout_ms.map(Duration::from_millis))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> SuggestionError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => SuggestionError::Timeout(timeout),
            _ => SuggestionError::Network(err),
        }
    }
}

#[async_trait]
impl SuggestionClient for HttpSuggestionClient {
    async fn suggest(&self, task_description: &str) -> Result<Suggestion, SuggestionError> {
        debug!(endpoint = %self.endpoint, description_len = task_description.len(), "suggest: called");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SuggestionRequest { task_description })
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "suggest: service error");
            return Err(SuggestionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|err| self.classify(err))?;
        let suggestion: Suggestion =
            serde_json::from_slice(&body).map_err(|err| SuggestionError::InvalidResponse(err.to_string()))?;
        debug!(suggested_deadline = %suggestion.suggested_deadline, "suggest: success");
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpSuggestionClient;
    use crate::config::SuggestConfig;
    use crate::model::Suggestion;
    use crate::suggest::{SuggestionClient, SuggestionError};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Option<Duration>) -> HttpSuggestionClient {
        HttpSuggestionClient::new(format!("{}/suggest", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn posts_task_description_and_parses_suggestion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/suggest"))
            .and(body_json(serde_json::json!({ "taskDescription": "Write report" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "suggestedDeadline": "2024-06-03",
                "reasoning": "short task"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let suggestion = client.suggest("Write report").await.unwrap();

        assert_eq!(suggestion, Suggestion::new("2024-06-03", "short task"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.suggest("Buy milk").await.unwrap_err();

        match err {
            SuggestionError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "deadline": "soon" })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.suggest("Buy milk").await.unwrap_err();

        assert!(matches!(err, SuggestionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "suggestedDeadline": "x", "reasoning": "y" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some(Duration::from_millis(100)));
        let err = client.suggest("Buy milk").await.unwrap_err();

        assert!(matches!(err, SuggestionError::Timeout(timeout) if timeout == Duration::from_millis(100)));
    }

    #[test]
    fn from_config_requires_endpoint() {
        let result = HttpSuggestionClient::from_config(&SuggestConfig::default());
        assert!(matches!(result, Err(SuggestionError::NotConfigured)));
    }

    #[test]
    fn from_config_trims_endpoint() {
        let config = SuggestConfig {
            endpoint: Some(" http://localhost:9/suggest ".to_string()),
            timeout_ms: Some(1500),
            ..SuggestConfig::default()
        };
        let client = HttpSuggestionClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/suggest");
    }
}
