mod conversation;
mod document;
mod embedding;

pub use conversation::{Answer, Conversation, Message, MessageRole};
pub use document::{chunk_text, Document, DocumentChunk, DocumentMetadata, SearchResult};
pub use embedding::Embedding;
