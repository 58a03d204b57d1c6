mod in_memory;
mod qdrant;

pub use in_memory::{InMemoryVectorStore, SNAPSHOT_FILE};
pub use qdrant::QdrantVectorStore;
