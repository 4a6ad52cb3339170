pub mod memory;
pub mod qdrant;

pub use memory::{MemoryIndex, MemoryIndexProvider};
pub use qdrant::{QdrantIndex, QdrantProvider};
