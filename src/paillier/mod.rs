pub mod math;
pub mod p_keygen;
pub mod p_encrypt;
pub mod p_decrypt;
pub mod p_homomorphic;

pub use p_keygen::{KeyPair, PublicKey, SecretKey};
pub use p_homomorphic::{HomomorphicCipher, Paillier};
