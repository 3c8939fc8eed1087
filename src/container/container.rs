// ============================================================================
// Conteneur chiffré
//
// Construit une seule fois par le pipeline de chiffrement, puis en lecture
// seule. La sérialisation est tout-ou-rien : les octets ne sont produits
// qu'à partir d'un conteneur complet et validé.
// ============================================================================

use num_bigint::BigUint;
use crate::chunk_codec::chunk_size_for_modulus;
use crate::container::container_storage::{container_to_json, json_to_container, ContainerJson, MAX_CONTAINER_BYTES};
use crate::crypto_error::CryptoError;
use crate::indistinguishability::{expected_mapping, Branch, IndistinguishabilityMetadata, MAX_REDUNDANCY_FACTOR};
use crate::paillier::p_keygen::{PublicKey, MAX_MODULUS_BITS, MIN_MODULUS_BITS};

pub const CONTAINER_FORMAT: &str = "PAILLIER-DUALMASK";
pub const CONTAINER_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub format:                String,
    pub version:               u32,
    pub timestamp:             u64,
    pub chunk_size:            usize,
    pub public_key:            PublicKey,
    pub chunks:                Vec<BigUint>,
    pub original_size_true:    usize,
    pub original_size_false:   usize,
    pub indistinguishability:  IndistinguishabilityMetadata,
}

impl Container {
    pub fn original_size(&self, branch: Branch) -> usize {
        match branch {
            Branch::True  => self.original_size_true,
            Branch::False => self.original_size_false,
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        self.validate()?;
        Ok(serde_json::to_vec_pretty(&container_to_json(self))?)
    }

    /// Taille bornée AVANT parsing, puis validation complète : aucune
    /// opération de déchiffrement n'a lieu sur un conteneur rejeté.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() > MAX_CONTAINER_BYTES {
            return Err(CryptoError::Serialization(format!(
                "{} octets (maximum {MAX_CONTAINER_BYTES})",
                bytes.len()
            )));
        }
        let json: ContainerJson = serde_json::from_slice(bytes)?;
        let container = json_to_container(&json)?;
        container.validate()?;
        Ok(container)
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        let fail = |msg: &str| -> Result<(), CryptoError> { Err(CryptoError::Serialization(msg.to_string())) };

        if self.format != CONTAINER_FORMAT {
            return fail("format inconnu");
        }
        if self.version != CONTAINER_VERSION {
            return fail("version non supportée");
        }

        let n = &self.public_key.n;
        if n.bits() < MIN_MODULUS_BITS || n.bits() > MAX_MODULUS_BITS {
            return fail("taille de module hors bornes");
        }
        if self.public_key != PublicKey::from_modulus(n.clone()) {
            return fail("clé publique incohérente (g != n+1)");
        }
        if self.chunk_size != chunk_size_for_modulus(n) {
            return fail("chunk_size incohérent avec n");
        }

        let meta = &self.indistinguishability;
        if meta.redundancy_factor > MAX_REDUNDANCY_FACTOR {
            return fail("facteur de redondance hors bornes");
        }
        let per_branch = meta.chunks_per_branch();
        if meta.noise_values_false.len() != per_branch {
            return fail("vecteurs de bruit de longueurs différentes");
        }
        let expected_len = per_branch
            .checked_mul(meta.redundancy_factor + 1)
            .and_then(|v| v.checked_mul(2));
        if expected_len != Some(self.chunks.len()) || meta.mapping.len() != self.chunks.len() {
            return fail("nombre de chunks incohérent");
        }
        if meta.mapping != expected_mapping(&meta.shuffle_seed, per_branch, meta.redundancy_factor) {
            return fail("mapping incohérent avec shuffle_seed");
        }

        if self.chunks.iter().any(|c| c >= &self.public_key.n_squared) {
            return fail("chunk hors de [0, n²)");
        }
        if meta.noise_values_true.iter().chain(&meta.noise_values_false).any(|k| k >= n) {
            return fail("bruit hors de [0, n)");
        }

        let capacity = per_branch.saturating_mul(self.chunk_size);
        if self.original_size_true > capacity || self.original_size_false > capacity {
            return fail("taille d'origine supérieure à la capacité");
        }

        Ok(())
    }
}
