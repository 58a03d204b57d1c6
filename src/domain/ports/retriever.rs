use crate::domain::{errors::DomainError, SearchResult};
use async_trait::async_trait;

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, DomainError>;
}
