pub mod client;
pub mod storage;

pub use client::EmbeddingClient;
pub use storage::{
    decode_embedding, encode_embedding, get_passages_without_embedding, store_embeddings_batch,
};
