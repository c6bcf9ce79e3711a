//! Chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::MessageGenerator;
use crate::error::{ConfigError, GenerationError};
use crate::storage::GenerationConfig;

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub struct HttpMessageGenerator {
    client: Client,
    endpoint: String,
    max_tokens: u32,
}

impl HttpMessageGenerator {
    /// Build a client with the configured endpoint and request timeout.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "generation".into(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

/// `error.message` from the body, else the status line.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string())
}

#[async_trait]
impl MessageGenerator for HttpMessageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        model_id: &str,
    ) -> Result<String, GenerationError> {
        let body = json!({
            "model": model_id,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.max_tokens,
        });

        tracing::debug!(endpoint = %self.endpoint, model = model_id, "requesting nudge message");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = rejection_message(status, &text);
            tracing::warn!(%status, %message, "text-generation request rejected");
            return Err(GenerationError::RemoteRejected(message));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Unreachable(format!("malformed response: {e}")))?;

        let first = parsed.choices.into_iter().next().ok_or_else(|| {
            GenerationError::Unreachable("malformed response: no choices".to_string())
        })?;

        Ok(first.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn generator_for(url: String) -> HttpMessageGenerator {
        HttpMessageGenerator::from_config(&GenerationConfig {
            endpoint: url,
            timeout_secs: 5,
            max_tokens: 100,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn success_returns_first_choice_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(Matcher::Json(json!({
                "model": "llama",
                "messages": [{ "role": "user", "content": "hello" }],
                "max_tokens": 100,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  Go do it!\n"}}]}"#)
            .create_async()
            .await;

        let gen = generator_for(format!("{}/v1/chat/completions", server.url()));
        let text = gen.generate("hello", "gsk_test", "llama").await.unwrap();
        assert_eq!(text, "  Go do it!\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_carries_remote_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let gen = generator_for(server.url());
        let err = gen.generate("p", "bad", "m").await.unwrap_err();
        assert_eq!(err, GenerationError::RemoteRejected("invalid_api_key".into()));
    }

    #[tokio::test]
    async fn rejection_without_json_body_falls_back_to_status_line() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let gen = generator_for(server.url());
        let err = gen.generate("p", "k", "m").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::RemoteRejected("503 Service Unavailable".into())
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_unreachable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let gen = generator_for(server.url());
        assert!(matches!(
            gen.generate("p", "k", "m").await,
            Err(GenerationError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn empty_choices_is_unreachable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let gen = generator_for(server.url());
        assert!(matches!(
            gen.generate("p", "k", "m").await,
            Err(GenerationError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn null_content_yields_empty_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":null}}]}"#)
            .create_async()
            .await;

        let gen = generator_for(server.url());
        assert_eq!(gen.generate("p", "k", "m").await.unwrap(), "");
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        let gen = generator_for("http://127.0.0.1:1/v1/chat/completions".into());
        assert!(matches!(
            gen.generate("p", "k", "m").await,
            Err(GenerationError::Unreachable(_))
        ));
    }
}
