use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    llm::LLMError,
    schemas::{Message, WithUsage},
};

#[async_trait]
pub trait LLM: Sync + Send {
    async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError>;
}

#[async_trait]
impl<L: LLM + ?Sized> LLM for Arc<L> {
    async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError> {
        (**self).generate(messages).await
    }
}

impl<L> From<L> for Box<dyn LLM>
where
    L: 'static + LLM,
{
    fn from(llm: L) -> Self {
        Box::new(llm)
    }
}
