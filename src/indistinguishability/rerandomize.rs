// Étape 1 : c' = c · r^n mod n², r frais par chunk.

use num_bigint::BigUint;
use rayon::prelude::*;
use crate::crypto_error::CryptoError;
use crate::paillier::{HomomorphicCipher, PublicKey};
use crate::randomness::ChunkRngSource;

const LABEL: &[u8] = b"rerandomize";

pub fn rerandomize_all(
    cipher: &dyn HomomorphicCipher,
    chunks: &[BigUint],
    pk: &PublicKey,
    source: &ChunkRngSource,
    stream: u8,
) -> Result<Vec<BigUint>, CryptoError> {
    chunks
        .par_iter()
        .enumerate()
        .map(|(i, c)| -> Result<BigUint, CryptoError> {
            let mut rng = source.rng_for(LABEL, stream, i as u64)?;
            cipher.rerandomize(c, pk, &mut rng)
        })
        .collect()
}
