use crate::config::GatewayConfig;
use crate::domain::model::{GatewayOutcome, PromptPair};
use crate::domain::ports::CompletionGateway;
use crate::utils::error::{AdviceError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const API_KEY_VARIABLE: &str = "LOVABLE_API_KEY";

/// Returned as the service-error detail when the gateway answers 200 without content.
pub const EMPTY_COMPLETION_DETAIL: &str = "Unable to generate advice at this time.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the hosted chat-completion gateway.
pub struct GatewayClient {
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    client: Client,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &GatewayConfig, client: Client) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, api_key: &SecretString, prompts: &PromptPair) -> Result<GatewayOutcome> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompts.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompts.user_prompt,
                },
            ],
        };

        tracing::debug!(
            "Sending completion request to {} (model {}, system.len={}, user.len={})",
            self.endpoint,
            self.model,
            prompts.system_prompt.len(),
            prompts.user_prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Gateway response status: {}", status);

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!("AI gateway rate limit hit");
                return Ok(GatewayOutcome::RateLimited);
            }
            StatusCode::PAYMENT_REQUIRED => {
                tracing::warn!("AI gateway reports payment required");
                return Ok(GatewayOutcome::PaymentRequired);
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!("AI gateway error: {} {}", s.as_u16(), body);
                return Ok(GatewayOutcome::ServiceError(body));
            }
            _ => {}
        }

        let completion: ChatResponse = response.json().await?;
        let advice = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty());

        Ok(match advice {
            Some(text) => GatewayOutcome::Success(text),
            None => {
                tracing::error!("AI gateway returned no completion content");
                GatewayOutcome::ServiceError(EMPTY_COMPLETION_DETAIL.to_string())
            }
        })
    }
}

#[async_trait]
impl CompletionGateway for GatewayClient {
    async fn complete(&self, prompts: &PromptPair) -> Result<GatewayOutcome> {
        // Checked before any network traffic.
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| AdviceError::MissingCredential {
                variable: API_KEY_VARIABLE.to_string(),
            })?;

        match self.send(api_key, prompts).await {
            Ok(outcome) => Ok(outcome),
            Err(AdviceError::Transport(e)) => {
                tracing::error!("AI gateway transport failure: {}", e);
                Ok(GatewayOutcome::ServiceError(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn prompts() -> PromptPair {
        PromptPair {
            system_prompt: "You are helpful.".to_string(),
            user_prompt: "When to start solid food?".to_string(),
        }
    }

    fn config(endpoint: String, api_key: Option<&str>) -> GatewayConfig {
        GatewayConfig {
            endpoint,
            model: "google/gemini-2.5-flash".to_string(),
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
        }
    }

    #[tokio::test]
    async fn test_complete_sends_system_then_user_message() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key")
                .json_body(json!({
                    "model": "google/gemini-2.5-flash",
                    "messages": [
                        {"role": "system", "content": "You are helpful."},
                        {"role": "user", "content": "When to start solid food?"}
                    ]
                }));
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "Around six months."}}]
            }));
        });

        let client = GatewayClient::new(&config(server.url("/v1/chat/completions"), Some("test-key")));
        let outcome = client.complete(&prompts()).await.unwrap();

        api_mock.assert();
        assert_eq!(outcome, GatewayOutcome::Success("Around six months.".to_string()));
    }

    #[tokio::test]
    async fn test_status_classification() {
        for (status, expected) in [
            (429, GatewayOutcome::RateLimited),
            (402, GatewayOutcome::PaymentRequired),
            (503, GatewayOutcome::ServiceError("upstream down".to_string())),
        ] {
            let server = MockServer::start();
            let api_mock = server.mock(|when, then| {
                when.method(POST).path("/");
                then.status(status).body("upstream down");
            });

            let client = GatewayClient::new(&config(server.url("/"), Some("test-key")));
            let outcome = client.complete(&prompts()).await.unwrap();

            api_mock.assert();
            assert_eq!(outcome, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200)
                .json_body(json!({"choices": [{"message": {"content": ""}}]}));
        });

        let client = GatewayClient::new(&config(server.url("/"), Some("test-key")));
        let outcome = client.complete(&prompts()).await.unwrap();

        assert_eq!(
            outcome,
            GatewayOutcome::ServiceError(EMPTY_COMPLETION_DETAIL.to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_choices_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(json!({"choices": []}));
        });

        let client = GatewayClient::new(&config(server.url("/"), Some("test-key")));
        let outcome = client.complete(&prompts()).await.unwrap();

        assert!(matches!(outcome, GatewayOutcome::ServiceError(_)));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200);
        });

        let client = GatewayClient::new(&config(server.url("/"), None));
        let err = client.complete(&prompts()).await.unwrap_err();

        assert!(matches!(err, AdviceError::MissingCredential { .. }));
        api_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_service_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = GatewayClient::new(&config("http://127.0.0.1:9/".to_string(), Some("test-key")));
        let outcome = client.complete(&prompts()).await.unwrap();

        assert!(matches!(outcome, GatewayOutcome::ServiceError(_)));
    }
}
