use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    llm::{LLMError, LLM},
    schemas::{IntoWithUsage, Message, TokenUsage, WithUsage},
};

/// Replays a fixed list of completions, then keeps returning `fallback`.
pub(crate) struct ScriptedLLM {
    replies: Mutex<VecDeque<Result<String, LLMError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<Vec<Message>>>,
    calls: AtomicUsize,
}

impl ScriptedLLM {
    pub(crate) fn new(replies: impl IntoIterator<Item = Result<String, LLMError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::new(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub(crate) fn repeating(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::new([])
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received so far, in call order.
    pub(crate) fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLM for ScriptedLLM {
    async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(messages.to_vec());

        let reply = self.replies.lock().unwrap().pop_front();
        match (reply, &self.fallback) {
            (Some(reply), _) => reply.map(|text| text.with_usage(Some(TokenUsage::new(10, 5)))),
            (None, Some(fallback)) => Ok(fallback.clone().with_usage(Some(TokenUsage::new(10, 5)))),
            (None, None) => Err(LLMError::OtherError("script exhausted".into())),
        }
    }
}
