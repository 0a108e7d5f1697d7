use crate::config::LlmSettings;
use crate::core::build_prompt;
use crate::models::RelevantDocument;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("LLM API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid LLM API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Produces an answer for a question, optionally grounded on retrieved documents
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate_answer(
        &self,
        query: &str,
        context_docs: &[RelevantDocument],
    ) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Groq chat completions client (OpenAI-compatible API)
pub struct GroqClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl GroqClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        tracing::info!("LLM client ready. Model: {}", settings.model);

        Ok(Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
        })
    }

    /// Send a single user message and return the completion text
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Chat completion failed: {} - {}", status, body);
            return Err(LlmError::ApiError(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("completion has no message content".into()))
    }
}

#[async_trait]
impl AnswerGenerator for GroqClient {
    async fn generate_answer(
        &self,
        query: &str,
        context_docs: &[RelevantDocument],
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(query, context_docs);
        tracing::debug!("Sending prompt with {} context documents", context_docs.len());
        self.complete(&prompt).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use mockito::Matcher;

    fn settings(base_url: String) -> LlmSettings {
        LlmSettings {
            api_key: "gsk_test".to_string(),
            base_url,
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_generate_answer_sends_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/v1/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJsonString(r#"{"model":"llama-3.1-8b-instant","max_tokens":1000}"#.to_string()),
                Matcher::Regex(r"\[Source 1\] \(Relevance: 75%\)".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Restart the router."}}]}"#)
            .create_async()
            .await;

        let client = GroqClient::new(&settings(format!("{}/openai/v1", server.url()))).unwrap();
        let docs = vec![RelevantDocument {
            id: "net-1".to_string(),
            content: "Restart the router, then call IT.".to_string(),
            metadata: Metadata::new(),
            distance: 0.25,
            similarity: 0.75,
        }];

        let answer = client.generate_answer("Internet down?", &docs).await.unwrap();
        assert_eq!(answer, "Restart the router.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let client = GroqClient::new(&settings(server.url())).unwrap();
        assert!(matches!(client.complete("hi").await, Err(LlmError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limit")
            .create_async()
            .await;

        let client = GroqClient::new(&settings(server.url())).unwrap();
        match client.complete("hi").await {
            Err(LlmError::ApiError(msg)) => assert!(msg.contains("rate limit")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = GroqClient::new(&settings(server.url())).unwrap();
        assert!(matches!(client.complete("hi").await, Err(LlmError::InvalidResponse(_))));
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }
}
