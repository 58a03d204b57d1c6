//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete
//! provider implementations.

pub mod services;

pub use services::{
    ConversationMemory, KnowledgeBase, MessagingGateway, QaService, RagService, WebhookOutcome,
};
