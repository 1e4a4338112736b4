use std::time::Duration;

use async_openai::types::{ChatChoice, CreateChatCompletionResponse};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    llm::{LLMError, LLM},
    schemas::{IntoWithUsage, Message, TokenUsage, WithUsage},
};

use super::{OpenAIBuilder, OpenAIRequest};

/// Chat model behind an OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAI {
    pub(super) client: Client,
    pub(super) api_base: String,
    pub(super) api_key: Option<SecretString>,
    pub(super) model: String,
    pub(super) temperature: Option<f32>,
    pub(super) max_tokens: Option<u32>,
    pub(super) stop_words: Option<Vec<String>>,
}

impl OpenAI {
    pub fn builder() -> OpenAIBuilder {
        OpenAIBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    async fn error_from_response(response: Response) -> LLMError {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
        let body = response.text().await.unwrap_or_default();
        LLMError::from_status(status, retry_after, &body)
    }
}

/// Text of the first choice that has any.
fn select_content(choices: Vec<ChatChoice>) -> Result<String, LLMError> {
    if choices.is_empty() {
        return Err(LLMError::ContentNotFound("No choices".into()));
    }

    choices
        .into_iter()
        .filter_map(|choice| choice.message.content)
        .find(|content| !content.trim().is_empty())
        .ok_or_else(|| LLMError::ContentNotFound("/choices/*/message/content".into()))
}

#[async_trait]
impl LLM for OpenAI {
    async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError> {
        let request = OpenAIRequest::new(&self.model, messages)?
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_stop(self.stop_words.clone());

        let mut http_request = self.client.post(self.completions_url()).json(&request);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key.expose_secret());
        }

        log::debug!(
            "sending {} message(s) to {} ({})",
            request.messages.len(),
            self.completions_url(),
            self.model
        );
        let response = http_request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.text().await?;
        let response = serde_json::from_str::<CreateChatCompletionResponse>(&body)?;
        let usage = response.usage.map(TokenUsage::from);
        let content = select_content(response.choices)?;

        Ok(content.with_usage(usage))
    }
}
