// Étape 2 : c' = c · g^k mod n², k enregistré par chunk.
// Retrait : homomorphic_add_constant(c', n - k mod n).

use num_bigint::BigUint;
use rayon::prelude::*;
use crate::crypto_error::CryptoError;
use crate::indistinguishability::mask_generator::MaskGenerator;
use crate::paillier::{HomomorphicCipher, PublicKey};
use crate::randomness::ChunkRngSource;

const LABEL: &[u8] = b"noise";

pub fn inject_noise(
    cipher: &dyn HomomorphicCipher,
    generator: &dyn MaskGenerator,
    chunks: &[BigUint],
    pk: &PublicKey,
    source: &ChunkRngSource,
    stream: u8,
) -> Result<(Vec<BigUint>, Vec<BigUint>), CryptoError> {
    let noisy: Vec<(BigUint, BigUint)> = chunks
        .par_iter()
        .enumerate()
        .map(|(i, c)| -> Result<(BigUint, BigUint), CryptoError> {
            let mut rng = source.rng_for(LABEL, stream, i as u64)?;
            let k = generator.sample(&pk.n, &mut rng);
            Ok((cipher.add_constant(c, &k, pk), k))
        })
        .collect::<Result<_, CryptoError>>()?;

    Ok(noisy.into_iter().unzip())
}

pub fn remove_noise(
    cipher: &dyn HomomorphicCipher,
    chunks: &[BigUint],
    noise: &[BigUint],
    pk: &PublicKey,
) -> Result<Vec<BigUint>, CryptoError> {
    if chunks.len() != noise.len() {
        return Err(CryptoError::Serialization("vecteur de bruit incohérent".into()));
    }
    Ok(chunks
        .par_iter()
        .zip(noise.par_iter())
        .map(|(c, k)| {
            let k = k % &pk.n;
            let inverse = (&pk.n - &k) % &pk.n;
            cipher.add_constant(c, &inverse, pk)
        })
        .collect())
}
