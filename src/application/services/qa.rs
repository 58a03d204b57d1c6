use std::sync::Arc;
use tracing::instrument;

use super::{ConversationGuard, ConversationMemory};
use crate::domain::{
    ports::{GenerationRequest, Generator, Retriever},
    Answer, DomainError, SearchResult,
};

/// Answers questions from retrieved context, one conversation at a time per id.
pub struct QaService {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    memory: Arc<ConversationMemory>,
    top_k: usize,
}

impl QaService {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        memory: Arc<ConversationMemory>,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            memory,
            top_k,
        }
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    #[instrument(skip(self, question), fields(top_k = self.top_k))]
    pub async fn ask(&self, question: &str, conversation_id: &str) -> Result<Answer, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("text must not be empty"));
        }
        if conversation_id.trim().is_empty() {
            return Err(DomainError::validation("conversation_id must not be empty"));
        }

        let mut conversation = self.memory.lock(conversation_id).await?;

        let (response, context) = match self.answer(question, &conversation).await {
            Ok(answered) => answered,
            Err(e) => {
                self.memory.discard_if_empty(conversation);
                return Err(e);
            }
        };

        conversation.record_turn(question, &response);

        Ok(Answer {
            response,
            sources: context.into_iter().map(|r| r.chunk.metadata).collect(),
            conversation_id: conversation_id.to_string(),
        })
    }

    async fn answer(
        &self,
        question: &str,
        conversation: &ConversationGuard,
    ) -> Result<(String, Vec<SearchResult>), DomainError> {
        let standalone = if conversation.messages().is_empty() {
            question.to_string()
        } else {
            self.generator
                .condense(question, conversation.messages())
                .await?
        };

        let context = self.retriever.retrieve(&standalone, self.top_k).await?;
        tracing::debug!(retrieved = context.len(), "context retrieved");

        let response = self
            .generator
            .generate(GenerationRequest {
                question: &standalone,
                context: &context,
                history: conversation.messages(),
            })
            .await?;

        Ok((response, context))
    }
}
