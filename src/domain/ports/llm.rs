use crate::domain::{errors::DomainError, Message, SearchResult};
use async_trait::async_trait;

/// Everything the language model sees for one answer.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub question: &'a str,
    pub context: &'a [SearchResult],
    pub history: &'a [Message],
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, DomainError>;

    /// Rewrites a follow-up into a question that stands on its own.
    async fn condense(&self, question: &str, history: &[Message]) -> Result<String, DomainError>;
}
