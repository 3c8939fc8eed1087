// ============================================================================
// Étape 4 : entrelacement des deux branches par Fisher–Yates à clé.
//
// Ordre canonique avant mélange :
//   [true 0 ×(f+1), true 1 ×(f+1), …, false 0 ×(f+1), …]
// sortie[i] = canonique[π(i)], mapping[i] = (branche, original_index) de π(i).
//
// π ne dépend que de (shuffle_seed, longueur) : le mapping stocké peut être
// recalculé et vérifié au chargement.
// ============================================================================

use num_bigint::BigUint;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use sha2::{Digest, Sha256};
use crate::crypto_error::CryptoError;
use crate::indistinguishability::metadata::{Branch, MappingEntry, SHUFFLE_SEED_LEN};

const DOMAIN: &[u8] = b"paillier-dualmask/interleave";

/// Permutation de [0, len) dérivée de la graine.
pub fn keyed_permutation(seed: &[u8; SHUFFLE_SEED_LEN], len: usize) -> Vec<usize> {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update(seed);
    let mut rng = ChaCha20Rng::from_seed(hasher.finalize().into());

    let mut perm: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.gen_range(0..=i);
        perm.swap(i, j);
    }
    perm
}

fn canonical_entries(per_branch_chunks: usize, redundancy_factor: usize) -> Vec<MappingEntry> {
    Branch::BOTH
        .into_iter()
        .flat_map(|branch| {
            (0..per_branch_chunks).flat_map(move |original_index| {
                std::iter::repeat(MappingEntry { branch, original_index }).take(redundancy_factor + 1)
            })
        })
        .collect()
}

/// Mapping que produit `interleave` pour ces paramètres.
pub fn expected_mapping(
    seed: &[u8; SHUFFLE_SEED_LEN],
    per_branch_chunks: usize,
    redundancy_factor: usize,
) -> Vec<MappingEntry> {
    let canonical = canonical_entries(per_branch_chunks, redundancy_factor);
    keyed_permutation(seed, canonical.len())
        .into_iter()
        .map(|src| canonical[src])
        .collect()
}

/// Les deux listes doivent être de même longueur (égalisées en amont).
pub fn interleave(
    true_entries: Vec<(usize, BigUint)>,
    false_entries: Vec<(usize, BigUint)>,
    seed: &[u8; SHUFFLE_SEED_LEN],
) -> Result<(Vec<BigUint>, Vec<MappingEntry>), CryptoError> {
    if true_entries.len() != false_entries.len() {
        return Err(CryptoError::InvalidInput("branches de longueurs différentes".into()));
    }

    let mut canonical: Vec<Option<(MappingEntry, BigUint)>> = true_entries
        .into_iter()
        .map(|(i, c)| (Branch::True, i, c))
        .chain(false_entries.into_iter().map(|(i, c)| (Branch::False, i, c)))
        .map(|(branch, original_index, c)| Some((MappingEntry { branch, original_index }, c)))
        .collect();

    let perm = keyed_permutation(seed, canonical.len());
    let mut chunks = Vec::with_capacity(perm.len());
    let mut mapping = Vec::with_capacity(perm.len());
    for src in perm {
        if let Some((entry, c)) = canonical[src].take() {
            mapping.push(entry);
            chunks.push(c);
        }
    }
    Ok((chunks, mapping))
}

/// Sélectionne les entrées de `branch`, triées (stable) par original_index.
pub fn deinterleave(
    chunks: &[BigUint],
    mapping: &[MappingEntry],
    branch: Branch,
) -> Result<Vec<(usize, BigUint)>, CryptoError> {
    if chunks.len() != mapping.len() {
        return Err(CryptoError::Serialization("mapping et chunks de longueurs différentes".into()));
    }

    let mut selected: Vec<(usize, BigUint)> = mapping
        .iter()
        .zip(chunks)
        .filter(|(entry, _)| entry.branch == branch)
        .map(|(entry, c)| (entry.original_index, c.clone()))
        .collect();
    selected.sort_by_key(|(index, _)| *index);
    Ok(selected)
}
