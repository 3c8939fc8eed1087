// ============================================================================
// DualMaskCipher — pipeline complet
//
// chiffrement : (texte₁, texte₂) → ChunkCodec → Paillier par chunk
//               → transformation d'indistinguabilité → Conteneur
// déchiffrement : (octets du conteneur, octets de clé) → classifieur
//               → retrait de la transformation → Paillier par chunk → ChunkCodec
//
// L'entrée de déchiffrement ne reçoit QUE le conteneur et la clé : la branche
// est toujours calculée par le classifieur, jamais fournie par l'appelant.
// ============================================================================

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use num_bigint::BigUint;
use num_traits::Zero;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use crate::chunk_codec::{ChunkCodec, DataType, DecodedPlaintext};
use crate::container::{Container, CONTAINER_FORMAT, CONTAINER_VERSION};
use crate::crypto_error::CryptoError;
use crate::dual_mask::config::DualMaskConfig;
use crate::indistinguishability::{Branch, IndistinguishabilityTransform};
use crate::key_classifier::{derive_branch_keys, BranchClassifier, BranchKeys, KeyMaterial, MASTER_SEED_LEN, Sha256MajorityClassifier};
use crate::paillier::{HomomorphicCipher, KeyPair, Paillier, PublicKey};
use crate::randomness::ChunkRngSource;

const CODEC_PAD_LABEL: &[u8] = b"codec-pad";
const CODEC_EQUALIZE_LABEL: &[u8] = b"codec-equalize";
const ENCRYPT_LABEL: &[u8] = b"encrypt";

/// Texte clair typé fourni au chiffrement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    pub data_type: DataType,
    pub bytes:     Vec<u8>,
}

impl Plaintext {
    pub fn new(data_type: DataType, bytes: impl Into<Vec<u8>>) -> Self {
        Plaintext { data_type, bytes: bytes.into() }
    }
}

pub struct DualMaskCipher {
    config:     DualMaskConfig,
    cipher:     Arc<dyn HomomorphicCipher>,
    classifier: Arc<dyn BranchClassifier>,
    transform:  IndistinguishabilityTransform,
}

impl DualMaskCipher {
    /// Collaborateurs déjà construits, injectés ici.
    pub fn new(
        config: DualMaskConfig,
        cipher: Arc<dyn HomomorphicCipher>,
        classifier: Arc<dyn BranchClassifier>,
        transform: IndistinguishabilityTransform,
    ) -> Result<Self, CryptoError> {
        config.validate()?;
        Ok(DualMaskCipher { config, cipher, classifier, transform })
    }

    /// Paillier + classifieur SHA-256 + stratégie de bruit de la configuration.
    pub fn from_config(config: DualMaskConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        let cipher: Arc<dyn HomomorphicCipher> = Arc::new(Paillier);
        let transform = IndistinguishabilityTransform::new(
            Arc::clone(&cipher),
            config.noise.build(),
            config.redundancy_factor,
        )?;
        DualMaskCipher::new(config, cipher, Arc::new(Sha256MajorityClassifier), transform)
    }

    pub fn config(&self) -> &DualMaskConfig {
        &self.config
    }

    /// Paire de session et clés des deux branches, dérivées de la graine maîtresse.
    pub fn derive_keys(&self, master_seed: &[u8; MASTER_SEED_LEN]) -> Result<BranchKeys, CryptoError> {
        derive_branch_keys(master_seed, self.config.key_bits, self.classifier.as_ref())
    }

    pub fn encrypt(
        &self,
        public_key: &PublicKey,
        true_plaintext: &Plaintext,
        false_plaintext: &Plaintext,
    ) -> Result<Container, CryptoError> {
        self.encrypt_with_source(public_key, true_plaintext, false_plaintext, &ChunkRngSource::fresh())
    }

    /// Variante à source d'aléa explicite (reproductible avec un nonce fixé).
    pub fn encrypt_with_source(
        &self,
        public_key: &PublicKey,
        true_plaintext: &Plaintext,
        false_plaintext: &Plaintext,
        source: &ChunkRngSource,
    ) -> Result<Container, CryptoError> {
        let codec = ChunkCodec::for_public_key(public_key)?;

        let mut encoded_true = codec.encode(
            &true_plaintext.bytes,
            true_plaintext.data_type,
            &mut source.rng_for(CODEC_PAD_LABEL, Branch::True.stream(), 0)?,
        )?;
        let mut encoded_false = codec.encode(
            &false_plaintext.bytes,
            false_plaintext.data_type,
            &mut source.rng_for(CODEC_PAD_LABEL, Branch::False.stream(), 0)?,
        )?;
        codec.equalize_chunk_counts(
            &mut encoded_true.values,
            &mut encoded_false.values,
            &mut source.rng_for(CODEC_EQUALIZE_LABEL, 0, 0)?,
        );
        debug!(chunks_per_branch = encoded_true.values.len(), chunk_size = codec.chunk_size(), "textes découpés");

        let true_chunks = self.encrypt_chunks(&encoded_true.values, public_key, source, Branch::True.stream())?;
        let false_chunks = self.encrypt_chunks(&encoded_false.values, public_key, source, Branch::False.stream())?;

        let (chunks, metadata) = self.transform.apply(&true_chunks, &false_chunks, public_key, source)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let container = Container {
            format:               CONTAINER_FORMAT.to_string(),
            version:              CONTAINER_VERSION,
            timestamp,
            chunk_size:           codec.chunk_size(),
            public_key:           public_key.clone(),
            chunks,
            original_size_true:   encoded_true.original_size,
            original_size_false:  encoded_false.original_size,
            indistinguishability: metadata,
        };
        container.validate()?;

        info!(chunks = container.chunks.len(), "conteneur construit");
        Ok(container)
    }

    /// Seule entrée de déchiffrement : octets du conteneur et octets de clé.
    pub fn decrypt(&self, container_bytes: &[u8], key: &[u8]) -> Result<DecodedPlaintext, CryptoError> {
        // from_json_bytes valide déjà le conteneur
        let container = Container::from_json_bytes(container_bytes)?;
        self.open_validated(&container, key)
    }

    pub fn decrypt_container(&self, container: &Container, key: &[u8]) -> Result<DecodedPlaintext, CryptoError> {
        container.validate()?;
        self.open_validated(container, key)
    }

    fn open_validated(&self, container: &Container, key: &[u8]) -> Result<DecodedPlaintext, CryptoError> {
        let key = KeyMaterial::from_bytes(key);
        let branch = self
            .classifier
            .classify(key.as_bytes(), Some(&container.public_key.modulus_bytes()));

        self.open_branch(container, &key, branch).map_err(|e| {
            debug!(error = %e, "déchiffrement interrompu");
            CryptoError::OperationFailed
        })
    }

    fn open_branch(
        &self,
        container: &Container,
        key: &KeyMaterial,
        branch: Branch,
    ) -> Result<DecodedPlaintext, CryptoError> {
        let pk = &container.public_key;
        let session = key.session_keypair(pk.n.bits())?;

        // Une clé étrangère n'est pas signalée : le déchiffrement se poursuit
        // et produit des octets sans rapport avec les textes.
        let sources = self.transform.remove(&container.chunks, &container.indistinguishability, branch, pk)?;
        let values = self.decrypt_chunks(&sources, &session);

        let codec = ChunkCodec::new(container.chunk_size)?;
        Ok(codec.decode(&values, container.original_size(branch)))
    }

    fn encrypt_chunks(
        &self,
        values: &[BigUint],
        pk: &PublicKey,
        source: &ChunkRngSource,
        stream: u8,
    ) -> Result<Vec<BigUint>, CryptoError> {
        let cipher = self.cipher.as_ref();
        values
            .par_iter()
            .enumerate()
            .map(|(i, m)| {
                let mut rng = source.rng_for(ENCRYPT_LABEL, stream, i as u64)?;
                cipher.encrypt(m, pk, &mut rng)
            })
            .collect()
    }

    // Un chunk indéchiffrable devient la valeur zéro (chunk nul au décodage)
    fn decrypt_chunks(&self, chunks: &[BigUint], session: &KeyPair) -> Vec<BigUint> {
        let cipher = self.cipher.as_ref();
        let decrypted: Vec<Option<BigUint>> = chunks
            .par_iter()
            .map(|c| cipher.decrypt(c, &session.public_key, &session.secret_key).ok())
            .collect();

        let degraded = decrypted.iter().filter(|v| v.is_none()).count();
        if degraded > 0 {
            warn!(degraded, "chunks indéchiffrables remplacés par des zéros");
        }
        decrypted.into_iter().map(|v| v.unwrap_or_else(BigUint::zero)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> DualMaskCipher {
        let config = DualMaskConfig { key_bits: 512, ..DualMaskConfig::default() };
        DualMaskCipher::from_config(config).unwrap()
    }

    #[test]
    fn test_concrete_scenario_hello_world() {
        let dm = cipher();
        let keys = dm.derive_keys(&[0u8; 32]).unwrap();
        let container = dm
            .encrypt(
                &keys.keypair.public_key,
                &Plaintext::new(DataType::Binary, b"HELLO".to_vec()),
                &Plaintext::new(DataType::Binary, b"WORLD!".to_vec()),
            )
            .unwrap();

        // Les deux textes tiennent dans un chunk : 1 chunk source par branche
        let per_branch = container.indistinguishability.chunks_per_branch();
        assert_eq!(per_branch, 1);
        assert_eq!(
            container.chunks.len(),
            2 * per_branch * (dm.config().redundancy_factor + 1)
        );

        let bytes = container.to_json_bytes().unwrap();
        let t = dm.decrypt(&bytes, keys.true_key.as_bytes()).unwrap();
        let f = dm.decrypt(&bytes, keys.false_key.as_bytes()).unwrap();
        assert_eq!(t.payload, b"HELLO".to_vec());
        assert_eq!(f.payload, b"WORLD!".to_vec());
        assert_eq!(t.data_type, Some(DataType::Binary));
    }

    #[test]
    fn test_foreign_key_gets_output_not_error() {
        let dm = cipher();
        let keys = dm.derive_keys(&[5u8; 32]).unwrap();
        let container = dm
            .encrypt(
                &keys.keypair.public_key,
                &Plaintext::new(DataType::Text, "secret A"),
                &Plaintext::new(DataType::Text, "secret B"),
            )
            .unwrap();

        let out = dm.decrypt_container(&container, b"cle-etrangere").unwrap();
        assert_ne!(out.payload, b"secret A".to_vec());
        assert_ne!(out.payload, b"secret B".to_vec());
    }

    #[test]
    fn test_bytes_and_in_memory_paths_agree() {
        let dm = cipher();
        let keys = dm.derive_keys(&[7u8; 32]).unwrap();
        let mut container = dm
            .encrypt(
                &keys.keypair.public_key,
                &Plaintext::new(DataType::Text, "par octets"),
                &Plaintext::new(DataType::Text, "en mémoire"),
            )
            .unwrap();
        let bytes = container.to_json_bytes().unwrap();

        for key in [&keys.true_key, &keys.false_key] {
            assert_eq!(
                dm.decrypt(&bytes, key.as_bytes()).unwrap(),
                dm.decrypt_container(&container, key.as_bytes()).unwrap()
            );
        }

        // Le chemin en mémoire garde sa propre validation
        container.chunks.pop();
        assert!(matches!(
            dm.decrypt_container(&container, keys.true_key.as_bytes()),
            Err(CryptoError::Serialization(_))
        ));
    }

    #[test]
    fn test_reproducible_with_fixed_nonce() {
        let dm = cipher();
        let keys = dm.derive_keys(&[6u8; 32]).unwrap();
        let a = Plaintext::new(DataType::Csv, "a,b\n1,2");
        let b = Plaintext::new(DataType::Json, "{\"k\":[1,2,3]}");
        let c1 = dm
            .encrypt_with_source(&keys.keypair.public_key, &a, &b, &ChunkRngSource::from_nonce([9u8; 32]))
            .unwrap();
        let c2 = dm
            .encrypt_with_source(&keys.keypair.public_key, &a, &b, &ChunkRngSource::from_nonce([9u8; 32]))
            .unwrap();
        assert_eq!(c1.chunks, c2.chunks);
        assert_eq!(c1.indistinguishability, c2.indistinguishability);
    }
}
