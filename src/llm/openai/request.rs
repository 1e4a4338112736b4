use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use serde::Serialize;

use crate::{
    llm::LLMError,
    schemas::{Message, MessageType},
};

/// Request payload sent to an OpenAI-compatible `chat/completions` endpoint.
#[derive(Serialize, Debug)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionRequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl OpenAIRequest {
    pub fn new(model: impl Into<String>, messages: &[Message]) -> Result<Self, LLMError> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OpenAIRequest {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            stop: None,
        })
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: Option<Vec<String>>) -> Self {
        self.stop = stop.filter(|s| !s.is_empty());
        self
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage, LLMError> {
    let content = message.content.clone();
    let message = match message.message_type {
        MessageType::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageType::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageType::Ai => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(message)
}
