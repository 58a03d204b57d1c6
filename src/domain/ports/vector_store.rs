use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding)
        -> Result<(), DomainError>;

    async fn upsert_many(
        &self,
        entries: &[(DocumentChunk, Embedding)],
    ) -> Result<(), DomainError> {
        for (chunk, embedding) in entries {
            self.upsert(chunk, embedding).await?;
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;

    /// Removes every stored chunk. Called before a full rebuild.
    async fn clear(&self) -> Result<(), DomainError>;

    /// Flushes store content to its persistence location, if it has one.
    async fn persist(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
