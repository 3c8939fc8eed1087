use serde::{Deserialize, Serialize};
use num_bigint::BigUint;
use num_traits::Num;
use crate::container::container::Container;
use crate::crypto_error::CryptoError;
use crate::indistinguishability::{IndistinguishabilityMetadata, MappingEntry, SHUFFLE_SEED_LEN};
use crate::paillier::p_keygen::PublicKey;

// ============================================================================
// Protection DoS parsing — limites de taille des entrées
//
// Sans ces limites, un conteneur hostile peut :
//   - faire charger plusieurs Go en mémoire avant toute validation ;
//   - soumettre des champs hex de plusieurs Mo, dont la conversion BigUint
//     est quadratique.
//
// Ces constantes sont vérifiées AVANT toute opération coûteuse.
// n² fait au plus 2·4096 bits = 2048 caractères hex ; 3072 laisse une marge.
// ============================================================================

/// Taille maximale d'un conteneur JSON en octets (64 Mo)
pub const MAX_CONTAINER_BYTES: usize = 64 * 1024 * 1024;

/// Longueur maximale d'un champ hexadécimal en caractères.
pub const MAX_HEX_FIELD_LEN: usize = 3_072;

// ============================================================================
// Structures JSON du format filaire
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicKeyJson {
    pub n: String,
    pub g: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetadataJson {
    pub shuffle_seed:       String,
    pub mapping:            Vec<MappingEntry>,
    pub noise_values_true:  Vec<String>,
    pub noise_values_false: Vec<String>,
    pub redundancy_factor:  usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContainerJson {
    pub format:               String,
    pub version:              u32,
    pub timestamp:            u64,
    pub chunk_size:           usize,
    pub public_key:           PublicKeyJson,
    pub chunks:               Vec<String>,
    pub original_size_true:   usize,
    pub original_size_false:  usize,
    pub indistinguishability: MetadataJson,
}

// ============================================================================
// Conversion BigUint ↔ hexadécimal
// ============================================================================

pub fn biguint_to_hex(value: &BigUint) -> String {
    value.to_str_radix(16).to_uppercase()
}

/// Convertit une string hex en BigUint.
///
/// Vérifie la longueur du champ AVANT la conversion pour éviter une
/// allocation BigUint géante (vecteur DoS CPU).
pub fn hex_to_biguint(hex_str: &str) -> Result<BigUint, CryptoError> {
    if hex_str.len() > MAX_HEX_FIELD_LEN {
        return Err(CryptoError::HexFieldTooLong {
            actual:  hex_str.len(),
            maximum: MAX_HEX_FIELD_LEN,
        });
    }
    BigUint::from_str_radix(hex_str, 16)
        .map_err(|_| CryptoError::HexParseError)
}

fn hex_list(values: &[BigUint]) -> Vec<String> {
    values.iter().map(biguint_to_hex).collect()
}

fn parse_hex_list(values: &[String]) -> Result<Vec<BigUint>, CryptoError> {
    values.iter().map(|s| hex_to_biguint(s)).collect()
}

// ============================================================================
// Conversion structures Rust → JSON
// ============================================================================

pub fn container_to_json(c: &Container) -> ContainerJson {
    let meta = &c.indistinguishability;
    ContainerJson {
        format:     c.format.clone(),
        version:    c.version,
        timestamp:  c.timestamp,
        chunk_size: c.chunk_size,
        public_key: PublicKeyJson {
            n: biguint_to_hex(&c.public_key.n),
            g: biguint_to_hex(&c.public_key.g),
        },
        chunks:              hex_list(&c.chunks),
        original_size_true:  c.original_size_true,
        original_size_false: c.original_size_false,
        indistinguishability: MetadataJson {
            shuffle_seed:       hex::encode(meta.shuffle_seed),
            mapping:            meta.mapping.clone(),
            noise_values_true:  hex_list(&meta.noise_values_true),
            noise_values_false: hex_list(&meta.noise_values_false),
            redundancy_factor:  meta.redundancy_factor,
        },
    }
}

// ============================================================================
// Conversion JSON → structures Rust
// Toute erreur de champ devient CryptoError::Serialization.
// ============================================================================

pub fn json_to_container(json: &ContainerJson) -> Result<Container, CryptoError> {
    let field = |name: &'static str| move |e: CryptoError| CryptoError::Serialization(format!("{name} : {e}"));

    let n = hex_to_biguint(&json.public_key.n).map_err(field("public_key.n"))?;
    let g = hex_to_biguint(&json.public_key.g).map_err(field("public_key.g"))?;
    let public_key = PublicKey::from_modulus(n);
    if public_key.g != g {
        return Err(CryptoError::Serialization("public_key.g : g != n+1".into()));
    }

    let meta = &json.indistinguishability;
    let seed_bytes = hex::decode(&meta.shuffle_seed)
        .map_err(|_| CryptoError::Serialization("shuffle_seed : hex invalide".into()))?;
    let shuffle_seed: [u8; SHUFFLE_SEED_LEN] = seed_bytes
        .try_into()
        .map_err(|_| CryptoError::Serialization("shuffle_seed : longueur invalide".into()))?;

    Ok(Container {
        format:              json.format.clone(),
        version:             json.version,
        timestamp:           json.timestamp,
        chunk_size:          json.chunk_size,
        public_key,
        chunks:              parse_hex_list(&json.chunks).map_err(field("chunks"))?,
        original_size_true:  json.original_size_true,
        original_size_false: json.original_size_false,
        indistinguishability: IndistinguishabilityMetadata {
            shuffle_seed,
            mapping:            meta.mapping.clone(),
            noise_values_true:  parse_hex_list(&meta.noise_values_true).map_err(field("noise_values_true"))?,
            noise_values_false: parse_hex_list(&meta.noise_values_false).map_err(field("noise_values_false"))?,
            redundancy_factor:  meta.redundancy_factor,
        },
    })
}
