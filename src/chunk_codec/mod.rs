pub mod chunk_codec;

pub use chunk_codec::{
    chunk_size_for_modulus, ChunkCodec, DataType, DecodedPlaintext, EncodedPlaintext,
    CHUNK_SAFETY_MARGIN_BITS,
};
