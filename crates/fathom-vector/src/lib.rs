//! C2: append-only embedding index with cosine k-NN and metadata filters.

mod embedding;
mod similarity;
mod store;

pub use embedding::{EmbeddingRecordBuilder, EntityType};
pub use similarity::cosine_similarity;
pub use store::InMemoryVectorStore;
