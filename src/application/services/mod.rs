mod gateway;
mod knowledge_base;
mod memory;
mod qa;
mod rag;

pub use gateway::{InboundMessage, MessagingGateway, WebhookOutcome, USER_MESSAGE_TOPIC};
pub use knowledge_base::{load_documents, IngestionReport, KnowledgeBase};
pub use memory::{ConversationGuard, ConversationMemory};
pub use qa::QaService;
pub use rag::RagService;
