// Étape 3 : chaque chunk est suivi de `factor` copies re-randomisées.
// Retrait : premier vu par original_index.

use num_bigint::BigUint;
use rayon::prelude::*;
use crate::crypto_error::CryptoError;
use crate::paillier::{HomomorphicCipher, PublicKey};
use crate::randomness::ChunkRngSource;

const LABEL: &[u8] = b"redundancy";

/// Sortie dans l'ordre canonique : (i, original), (i, copie 1) … (i, copie f).
pub fn add_redundancy(
    cipher: &dyn HomomorphicCipher,
    chunks: &[BigUint],
    factor: usize,
    pk: &PublicKey,
    source: &ChunkRngSource,
    stream: u8,
) -> Result<Vec<(usize, BigUint)>, CryptoError> {
    let groups: Vec<Vec<(usize, BigUint)>> = chunks
        .par_iter()
        .enumerate()
        .map(|(i, c)| -> Result<Vec<(usize, BigUint)>, CryptoError> {
            let mut rng = source.rng_for(LABEL, stream, i as u64)?;
            let mut group = Vec::with_capacity(factor + 1);
            group.push((i, c.clone()));
            for _ in 0..factor {
                group.push((i, cipher.rerandomize(c, pk, &mut rng)?));
            }
            Ok(group)
        })
        .collect::<Result<_, CryptoError>>()?;

    Ok(groups.into_iter().flatten().collect())
}

/// `entries` doit être trié par original_index (tri stable).
pub fn remove_redundancy(
    entries: Vec<(usize, BigUint)>,
    expected_len: usize,
) -> Result<Vec<BigUint>, CryptoError> {
    let mut out: Vec<BigUint> = Vec::with_capacity(expected_len);
    for (index, c) in entries {
        if index == out.len() {
            out.push(c);
        } else if index > out.len() {
            return Err(CryptoError::Serialization("mapping incomplet".into()));
        }
    }
    if out.len() != expected_len {
        return Err(CryptoError::Serialization("mapping incomplet".into()));
    }
    Ok(out)
}
