pub mod p_encrypt;

pub use p_encrypt::{p_encrypt, p_encrypt_with_rng, sample_unit};
