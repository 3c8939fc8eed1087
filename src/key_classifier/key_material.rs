// ============================================================================
// Matériel de clé
//
// Une clé de branche fait 64 octets : graine maîtresse (32) ‖ suffixe (32).
// La graine maîtresse (les 32 premiers octets, ou la clé entière si elle est
// plus courte) détermine seule la paire Paillier de session :
//
//   graine de session = SHA256(domaine ‖ graine maîtresse)
//   paire             = p_keygen_from_seed(bits, graine de session)
//
// Les deux clés de branche partagent donc la même paire ; seul le classifieur
// les distingue.
// ============================================================================

use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroize;
use crate::crypto_error::CryptoError;
use crate::indistinguishability::metadata::Branch;
use crate::key_classifier::classifier::BranchClassifier;
use crate::paillier::p_keygen::{p_keygen_from_seed, KeyPair};

pub const MASTER_SEED_LEN: usize = 32;
pub const BRANCH_KEY_LEN: usize = 64;

/// Borne de la recherche d'une clé par branche (échec en ~2^-256).
pub const MAX_KEY_DERIVATION_ATTEMPTS: u32 = 256;

const SESSION_DOMAIN: &[u8] = b"paillier-dualmask/session";
const BRANCH_KEY_DOMAIN: &[u8] = b"paillier-dualmask/branch-key";

#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        KeyMaterial { bytes: bytes.to_vec() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn master_seed(&self) -> &[u8] {
        &self.bytes[..self.bytes.len().min(MASTER_SEED_LEN)]
    }

    pub fn session_seed(&self) -> [u8; 32] {
        session_seed_for(self.master_seed())
    }

    pub fn session_keypair(&self, modulus_bits: u64) -> Result<KeyPair, CryptoError> {
        let mut seed = self.session_seed();
        let kp = p_keygen_from_seed(modulus_bits, &seed);
        seed.zeroize();
        kp
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        hex::decode(s.trim())
            .map(|bytes| KeyMaterial { bytes })
            .map_err(|_| CryptoError::HexParseError)
    }
}

// Jamais de matériel secret dans les traces
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial({} octets)", self.bytes.len())
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

fn session_seed_for(master_seed: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SESSION_DOMAIN);
    hasher.update(master_seed);
    hasher.finalize().into()
}

/// Les deux clés de branche et la paire de session qu'elles partagent.
#[derive(Debug)]
pub struct BranchKeys {
    pub true_key:  KeyMaterial,
    pub false_key: KeyMaterial,
    pub keypair:   KeyPair,
}

impl BranchKeys {
    pub fn key_for(&self, branch: Branch) -> &KeyMaterial {
        match branch {
            Branch::True  => &self.true_key,
            Branch::False => &self.false_key,
        }
    }
}

/// Dérive, de façon déterministe, une clé classée True et une clé classée
/// False à partir de la graine maîtresse.
///
/// La métadonnée passée au classifieur est le module public n de la session,
/// la même que celle lue dans le conteneur au déchiffrement.
pub fn derive_branch_keys(
    master_seed: &[u8; MASTER_SEED_LEN],
    modulus_bits: u64,
    classifier: &dyn BranchClassifier,
) -> Result<BranchKeys, CryptoError> {
    let keypair = KeyMaterial::from_bytes(master_seed).session_keypair(modulus_bits)?;
    let metadata = keypair.public_key.modulus_bytes();

    let mut true_key: Option<KeyMaterial> = None;
    let mut false_key: Option<KeyMaterial> = None;

    for counter in 0..MAX_KEY_DERIVATION_ATTEMPTS {
        if true_key.is_some() && false_key.is_some() {
            break;
        }

        let mut hasher = Sha256::new();
        hasher.update(BRANCH_KEY_DOMAIN);
        hasher.update(master_seed);
        hasher.update(counter.to_be_bytes());
        let suffix = hasher.finalize();

        let mut bytes = Vec::with_capacity(BRANCH_KEY_LEN);
        bytes.extend_from_slice(master_seed);
        bytes.extend_from_slice(&suffix);
        let candidate = KeyMaterial { bytes };

        let slot = match classifier.classify(candidate.as_bytes(), Some(&metadata)) {
            Branch::True  => &mut true_key,
            Branch::False => &mut false_key,
        };
        if slot.is_none() {
            *slot = Some(candidate);
        }
    }

    let (true_key, false_key) = match (true_key, false_key) {
        (Some(t), Some(f)) => (t, f),
        _ => return Err(CryptoError::KeyGenExhausted { attempts: MAX_KEY_DERIVATION_ATTEMPTS }),
    };

    // Le classifieur est déterministe : une seconde évaluation doit concorder
    if classifier.classify(true_key.as_bytes(), Some(&metadata)) != Branch::True
        || classifier.classify(false_key.as_bytes(), Some(&metadata)) != Branch::False
    {
        return Err(CryptoError::ClassifierInconsistency);
    }

    debug!("clés de branche dérivées");
    Ok(BranchKeys { true_key, false_key, keypair })
}
