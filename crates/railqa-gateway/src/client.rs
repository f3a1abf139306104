use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use railqa_core::config::GatewayConfig;

use crate::error::GatewayError;
use crate::types::{
    AnswerResponse, GenerationRequest, GenerationResponse, Probe, QuestionRequest,
    GENERATION_ROUTE, QA_ROUTE,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The backend routes consumed by the client.
///
/// Implementations hold no per-call state, so one gateway can be shared by
/// every state machine and called concurrently.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// POST `{question}` to the question-answer route.
    async fn ask(&self, question: &str) -> Result<AnswerResponse, GatewayError>;

    /// POST `{description}` to the diagram-generation route.
    async fn generate(&self, description: &str) -> Result<GenerationResponse, GatewayError>;

    /// GET a liveness route. Only the status is inspected.
    async fn probe(&self, probe: Probe) -> Result<(), GatewayError>;
}

/// Run a gateway call with an upper bound on how long it may take.
///
/// A call still outstanding at `limit` is dropped and reported as
/// `GatewayError::Timeout`.
pub async fn call_with_timeout<T, F>(limit: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout(limit)),
    }
}

/// reqwest-backed gateway talking to the backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn post_json<B, R>(&self, route: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(route);
        tracing::debug!(url = %url, "POST");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Backend returned error status");
            return Err(GatewayError::Status(status.as_u16()));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn ask(&self, question: &str) -> Result<AnswerResponse, GatewayError> {
        let request = QuestionRequest {
            question: question.to_string(),
        };
        self.post_json(QA_ROUTE, &request).await
    }

    async fn generate(&self, description: &str) -> Result<GenerationResponse, GatewayError> {
        let request = GenerationRequest {
            description: description.to_string(),
        };
        self.post_json(GENERATION_ROUTE, &request).await
    }

    async fn probe(&self, probe: Probe) -> Result<(), GatewayError> {
        let url = self.url(probe.route());
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            tracing::debug!(probe = %probe, status = status.as_u16(), "Probe failed");
            Err(GatewayError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = HttpGateway::new("http://localhost:8000/").unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
        assert_eq!(gateway.url(QA_ROUTE), "http://localhost:8000/api/qa");
        assert_eq!(
            gateway.url(Probe::VectorStore.route()),
            "http://localhost:8000/api/health/vectordb"
        );
    }

    #[test]
    fn test_from_config() {
        let config = GatewayConfig::default();
        let gateway = HttpGateway::from_config(&config).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_with_timeout_expires() {
        let result: Result<(), GatewayError> = call_with_timeout(
            Duration::from_secs(5),
            std::future::pending::<Result<(), GatewayError>>(),
        )
        .await;
        assert_eq!(result, Err(GatewayError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn test_call_with_timeout_passes_result_through() {
        let ok = call_with_timeout(Duration::from_secs(5), async { Ok::<_, GatewayError>(7) }).await;
        assert_eq!(ok, Ok(7));

        let err = call_with_timeout(Duration::from_secs(5), async {
            Err::<(), _>(GatewayError::Status(502))
        })
        .await;
        assert_eq!(err, Err(GatewayError::Status(502)));
    }
}
