pub mod store;
pub mod vector;

pub use store::{cosine_similarity, ScoredPassage, StoredPassage, VectorStore};
pub use vector::VectorRetriever;
