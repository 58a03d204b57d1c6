use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, DocumentChunk, DocumentMetadata, DomainError, Embedding, SearchResult,
};

const UPSERT_BATCH: usize = 256;

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }

    fn to_point(chunk: &DocumentChunk, embedding: &Embedding) -> Result<PointStruct, DomainError> {
        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id.to_string(),
            "document_id": chunk.document_id.to_string(),
            "content": chunk.content,
            "chunk_index": chunk.chunk_index,
            "source": chunk.metadata.source,
            "content_type": chunk.metadata.content_type,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        Ok(PointStruct::new(
            chunk.id.to_string(),
            embedding.as_slice().to_vec(),
            payload,
        ))
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding) -> Result<(), DomainError> {
        self.upsert_many(&[(chunk.clone(), embedding.clone())]).await
    }

    async fn upsert_many(
        &self,
        entries: &[(DocumentChunk, Embedding)],
    ) -> Result<(), DomainError> {
        for batch in entries.chunks(UPSERT_BATCH) {
            let points = batch
                .iter()
                .map(|(chunk, embedding)| Self::to_point(chunk, embedding))
                .collect::<Result<Vec<_>, _>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let chunk_id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
                let document_id: Uuid = payload.get("document_id")?.as_str()?.parse().ok()?;
                let content = payload.get("content")?.as_str()?.to_string();
                let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;
                let source = payload.get("source")?.as_str()?.to_string();
                let content_type = payload
                    .get("content_type")
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .unwrap_or_else(|| "text/plain".to_string());

                let chunk = DocumentChunk {
                    id: chunk_id,
                    document_id,
                    content,
                    chunk_index,
                    metadata: DocumentMetadata {
                        source,
                        content_type,
                    },
                };

                Some(SearchResult {
                    chunk,
                    score: point.score,
                })
            })
            .collect();

        Ok(search_results)
    }

    /// Drops and recreates the collection.
    async fn clear(&self) -> Result<(), DomainError> {
        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;
        self.ensure_collection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::point_id::PointIdOptions;

    #[test]
    fn test_point_id_is_the_full_chunk_uuid() {
        let chunks = crate::domain::Document::new("a.txt", "word ".repeat(600)).chunks(1000, 200);
        assert!(chunks.len() > 1);

        let ids: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let point = QdrantVectorStore::to_point(chunk, &Embedding::new(vec![1.0])).unwrap();
                match point.id.and_then(|id| id.point_id_options) {
                    Some(PointIdOptions::Uuid(id)) => id,
                    other => panic!("expected uuid point id, got {other:?}"),
                }
            })
            .collect();

        for (chunk, id) in chunks.iter().zip(&ids) {
            assert_eq!(*id, chunk.id.to_string());
        }
        assert_ne!(ids[0], ids[1]);
    }
}
