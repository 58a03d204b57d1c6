use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;
use tracing::instrument;

use crate::domain::{ports::Embedder, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;
use crate::infrastructure::llm::require_env;

pub struct OpenAiEmbedder {
    client: openai::Client,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        require_env("OPENAI_API_KEY")?;
        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);
        let embedding = model
            .embed_text(text)
            .await
            .map_err(|e| DomainError::external(format!("Embedding failed: {e}")))?;

        Ok(Embedding::from_f64(embedding.vec))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.client.embedding_model(&self.model);
        let mut out = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embeddings = model
                .embed_texts(batch.iter().map(|t| t.to_string()).collect::<Vec<_>>())
                .await
                .map_err(|e| DomainError::external(format!("Embedding failed: {e}")))?;

            if embeddings.len() != batch.len() {
                return Err(DomainError::external(format!(
                    "Embedding provider returned {} vectors for {} inputs",
                    embeddings.len(),
                    batch.len()
                )));
            }
            out.extend(embeddings.into_iter().map(|e| Embedding::from_f64(e.vec)));
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
