use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

pub const SHUFFLE_SEED_LEN: usize = 32;

/// Identité logique d'un des deux textes clairs du conteneur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    True,
    False,
}

impl Branch {
    pub const BOTH: [Branch; 2] = [Branch::True, Branch::False];

    /// Indice de flux pour ChunkRngSource.
    pub fn stream(&self) -> u8 {
        match self {
            Branch::True  => 0,
            Branch::False => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub branch:         Branch,
    pub original_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndistinguishabilityMetadata {
    pub shuffle_seed:       [u8; SHUFFLE_SEED_LEN],
    pub mapping:            Vec<MappingEntry>,
    pub noise_values_true:  Vec<BigUint>,
    pub noise_values_false: Vec<BigUint>,
    pub redundancy_factor:  usize,
}

impl IndistinguishabilityMetadata {
    pub fn noise_values(&self, branch: Branch) -> &[BigUint] {
        match branch {
            Branch::True  => &self.noise_values_true,
            Branch::False => &self.noise_values_false,
        }
    }

    /// Nombre de chunks sources par branche (après égalisation).
    pub fn chunks_per_branch(&self) -> usize {
        self.noise_values_true.len()
    }
}
