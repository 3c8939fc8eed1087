pub mod chunk_rng;

pub use chunk_rng::{ChunkRngSource, NONCE_LEN};
