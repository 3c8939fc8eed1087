// Déclaration des modules
pub mod crypto_error;
pub mod paillier;
pub mod randomness;
pub mod chunk_codec;
pub mod indistinguishability;
pub mod key_classifier;
pub mod container;
pub mod dual_mask;

pub use crate::paillier::math;
pub use crate::paillier::p_keygen;
pub use crate::paillier::p_encrypt;
pub use crate::paillier::p_decrypt;
pub use crate::paillier::p_homomorphic;

// Types Paillier et interface homomorphe
pub use p_keygen::{KeyPair, PublicKey, SecretKey};
pub use p_homomorphic::{HomomorphicCipher, Paillier};

// Erreur centralisée
pub use crypto_error::{CryptoError, Result};

// Composants du pipeline
pub use chunk_codec::{ChunkCodec, DataType, DecodedPlaintext};
pub use indistinguishability::{Branch, IndistinguishabilityTransform, MaskGenerator};
pub use key_classifier::{BranchClassifier, BranchKeys, KeyMaterial, Sha256MajorityClassifier};
pub use container::Container;
pub use randomness::ChunkRngSource;

// Point d'entrée
pub use dual_mask::{DualMaskCipher, DualMaskConfig, NoiseConfig, Plaintext};
