use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{Embedder, Retriever, VectorStore},
    DocumentChunk, DomainError, SearchResult,
};

pub struct RagService {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl RagService {
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            vector_store,
        }
    }

    /// Replaces the store content with `chunks` and flushes it.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn rebuild_index(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::external(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        let expected = self.embedder.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.dimension() != expected) {
            return Err(DomainError::external(format!(
                "expected {expected}-dimensional embeddings, got {}",
                bad.dimension()
            )));
        }

        let entries: Vec<(DocumentChunk, _)> = chunks.iter().cloned().zip(embeddings).collect();

        self.vector_store.clear().await?;
        self.vector_store.upsert_many(&entries).await?;
        self.vector_store.persist().await
    }
}

#[async_trait]
impl Retriever for RagService {
    #[instrument(skip(self))]
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedder.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }
}
