pub mod config;
pub mod embedding;
pub mod llm;
pub mod messaging;
pub mod vector_store;

pub use config::{AppConfig, LlmProvider, VectorStoreBackend};
pub use embedding::OpenAiEmbedder;
pub use llm::RigGenerator;
pub use messaging::IntercomClient;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
