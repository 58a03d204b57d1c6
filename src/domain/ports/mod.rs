mod embedding;
mod llm;
mod messaging;
mod retriever;
mod vector_store;

pub use embedding::Embedder;
pub use llm::{GenerationRequest, Generator};
pub use messaging::MessagingPlatform;
pub use retriever::Retriever;
pub use vector_store::VectorStore;
