use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

pub const SNAPSHOT_FILE: &str = "index.json";

/// Exhaustive cosine scan over chunks held in memory, optionally snapshotted
/// to `<persist_directory>/index.json`.
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
    persist_directory: Option<PathBuf>,
}

#[derive(Serialize)]
struct SnapshotEntry<'a> {
    chunk: &'a DocumentChunk,
    embedding: &'a Embedding,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            persist_directory: None,
        }
    }

    pub fn with_persist_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_directory = Some(dir.into());
        self
    }

    pub fn len(&self) -> usize {
        self.chunks.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(c, _)| c.id != chunk.id);
        store.push((chunk.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .clear();
        Ok(())
    }

    async fn persist(&self) -> Result<(), DomainError> {
        let Some(dir) = &self.persist_directory else {
            return Ok(());
        };

        let json = {
            let store = self
                .chunks
                .read()
                .map_err(|e| DomainError::internal(e.to_string()))?;
            let entries: Vec<SnapshotEntry<'_>> = store
                .iter()
                .map(|(chunk, embedding)| SnapshotEntry { chunk, embedding })
                .collect();
            serde_json::to_vec(&entries).map_err(|e| DomainError::internal(e.to_string()))?
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::internal(format!("{}: {e}", dir.display())))?;
        let path = dir.join(SNAPSHOT_FILE);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| DomainError::internal(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), chunks = self.len(), "vector store snapshot written");
        Ok(())
    }
}
