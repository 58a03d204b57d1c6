//! In-process fakes for the provider ports.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{
    ports::{Embedder, GenerationRequest, Generator, MessagingPlatform},
    DomainError, Embedding, Message,
};

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
pub struct HashingEmbedder {
    dimension: usize,
    reported_dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: 256,
            reported_dimension: 256,
        }
    }
}

impl HashingEmbedder {
    /// Advertises `dimension` while still producing 256-wide vectors.
    pub fn reporting_dimension(dimension: usize) -> Self {
        Self {
            reported_dimension: dimension,
            ..Self::default()
        }
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut vec = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vec[(hasher.finish() % self.dimension as u64) as usize] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.reported_dimension
    }
}

#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub question: String,
    pub sources: Vec<String>,
    pub history: Vec<Message>,
}

/// Answers with the top-ranked chunk verbatim and records every request.
#[derive(Default)]
pub struct EchoGenerator {
    pub generations: Mutex<Vec<RecordedGeneration>>,
    pub condensed: Mutex<Vec<String>>,
    delay: Option<Duration>,
    fail_with: Option<String>,
}

impl EchoGenerator {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn generation_count(&self) -> usize {
        self.generations.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, DomainError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(DomainError::external(message.clone()));
        }

        self.generations.lock().unwrap().push(RecordedGeneration {
            question: request.question.to_string(),
            sources: request
                .context
                .iter()
                .map(|r| r.chunk.metadata.source.clone())
                .collect(),
            history: request.history.to_vec(),
        });

        Ok(match request.context.first() {
            Some(top) => format!("According to our documents: {}", top.chunk.content),
            None => "I don't know.".to_string(),
        })
    }

    async fn condense(&self, question: &str, _history: &[Message]) -> Result<String, DomainError> {
        self.condensed.lock().unwrap().push(question.to_string());
        Ok(question.to_string())
    }
}

/// Messaging platform that keeps every reply instead of sending it.
#[derive(Default)]
pub struct RecordingPlatform {
    pub replies: Mutex<Vec<(String, String)>>,
}

impl RecordingPlatform {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPlatform for RecordingPlatform {
    async fn reply_as_admin(&self, conversation_id: &str, body: &str) -> Result<(), DomainError> {
        self.replies
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), body.to_string()));
        Ok(())
    }
}
