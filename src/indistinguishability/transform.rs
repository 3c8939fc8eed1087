// ============================================================================
// IndistinguishabilityTransform
//
// apply  : égalisation → re-randomisation → bruit → redondance → entrelacement
// remove : désentrelacement → redondance → bruit   (ordre exactement inverse ;
//          la re-randomisation conserve le clair et n'a pas d'inverse)
// ============================================================================

use std::sync::Arc;
use num_bigint::{BigUint, RandBigInt};
use tracing::debug;
use crate::crypto_error::CryptoError;
use crate::indistinguishability::interleave::{deinterleave, interleave};
use crate::indistinguishability::mask_generator::MaskGenerator;
use crate::indistinguishability::metadata::{Branch, IndistinguishabilityMetadata, SHUFFLE_SEED_LEN};
use crate::indistinguishability::noise::{inject_noise, remove_noise};
use crate::indistinguishability::redundancy::{add_redundancy, remove_redundancy};
use crate::indistinguishability::rerandomize::rerandomize_all;
use crate::paillier::{HomomorphicCipher, PublicKey};
use crate::randomness::ChunkRngSource;

pub const MAX_REDUNDANCY_FACTOR: usize = 8;

const PAD_LABEL: &[u8] = b"branch-pad";
const SHUFFLE_SEED_LABEL: &[u8] = b"shuffle-seed";

pub struct IndistinguishabilityTransform {
    cipher:            Arc<dyn HomomorphicCipher>,
    mask_generator:    Arc<dyn MaskGenerator>,
    redundancy_factor: usize,
}

impl IndistinguishabilityTransform {
    pub fn new(
        cipher: Arc<dyn HomomorphicCipher>,
        mask_generator: Arc<dyn MaskGenerator>,
        redundancy_factor: usize,
    ) -> Result<Self, CryptoError> {
        if redundancy_factor > MAX_REDUNDANCY_FACTOR {
            return Err(CryptoError::InvalidInput(format!(
                "facteur de redondance {redundancy_factor} > {MAX_REDUNDANCY_FACTOR}"
            )));
        }
        Ok(IndistinguishabilityTransform { cipher, mask_generator, redundancy_factor })
    }

    pub fn redundancy_factor(&self) -> usize {
        self.redundancy_factor
    }

    pub fn apply(
        &self,
        true_chunks: &[BigUint],
        false_chunks: &[BigUint],
        pk: &PublicKey,
        source: &ChunkRngSource,
    ) -> Result<(Vec<BigUint>, IndistinguishabilityMetadata), CryptoError> {
        let cipher = self.cipher.as_ref();
        let generator = self.mask_generator.as_ref();
        let target = true_chunks.len().max(false_chunks.len());

        let mut noise_values_true = Vec::new();
        let mut noise_values_false = Vec::new();
        let mut expanded = Vec::with_capacity(2);

        for branch in Branch::BOTH {
            let (chunks, noise_slot) = match branch {
                Branch::True  => (true_chunks, &mut noise_values_true),
                Branch::False => (false_chunks, &mut noise_values_false),
            };
            let stream = branch.stream();

            let padded = self.pad_to(chunks, target, pk, source, stream)?;
            let fresh = rerandomize_all(cipher, &padded, pk, source, stream)?;
            let (noisy, noise) = inject_noise(cipher, generator, &fresh, pk, source, stream)?;
            *noise_slot = noise;
            expanded.push(add_redundancy(cipher, &noisy, self.redundancy_factor, pk, source, stream)?);
        }

        let false_entries = expanded.pop().unwrap_or_default();
        let true_entries = expanded.pop().unwrap_or_default();

        let shuffle_seed: [u8; SHUFFLE_SEED_LEN] = source.derive(SHUFFLE_SEED_LABEL, 0, 0)?;
        let (chunks, mapping) = interleave(true_entries, false_entries, &shuffle_seed)?;

        debug!(
            chunks = chunks.len(),
            redundancy = self.redundancy_factor,
            strategy = generator.name(),
            "transformation d'indistinguabilité appliquée"
        );

        Ok((
            chunks,
            IndistinguishabilityMetadata {
                shuffle_seed,
                mapping,
                noise_values_true,
                noise_values_false,
                redundancy_factor: self.redundancy_factor,
            },
        ))
    }

    /// Rend les chunks sources de `branch`, bruit retiré, dans l'ordre d'origine.
    pub fn remove(
        &self,
        chunks: &[BigUint],
        metadata: &IndistinguishabilityMetadata,
        branch: Branch,
        pk: &PublicKey,
    ) -> Result<Vec<BigUint>, CryptoError> {
        let selected = deinterleave(chunks, &metadata.mapping, branch)?;
        let sources = remove_redundancy(selected, metadata.chunks_per_branch())?;
        remove_noise(self.cipher.as_ref(), &sources, metadata.noise_values(branch), pk)
    }

    // Complète avec des chiffrés de valeurs aléatoires jusqu'à `target`.
    fn pad_to(
        &self,
        chunks: &[BigUint],
        target: usize,
        pk: &PublicKey,
        source: &ChunkRngSource,
        stream: u8,
    ) -> Result<Vec<BigUint>, CryptoError> {
        let mut out = chunks.to_vec();
        for i in chunks.len()..target {
            let mut rng = source.rng_for(PAD_LABEL, stream, i as u64)?;
            let filler = rng.gen_biguint_below(&pk.n);
            out.push(self.cipher.encrypt(&filler, pk, &mut rng)?);
        }
        Ok(out)
    }
}
