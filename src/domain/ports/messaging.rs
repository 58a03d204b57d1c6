use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait MessagingPlatform: Send + Sync {
    async fn reply_as_admin(&self, conversation_id: &str, body: &str) -> Result<(), DomainError>;
}
