pub mod p_keygen;

pub use p_keygen::{
    check_modulus_bits, p_keygen, p_keygen_from_seed, p_keygen_with_rng,
    KeyPair, PublicKey, SecretKey, MAX_KEYGEN_ATTEMPTS, MIN_MODULUS_BITS, MAX_MODULUS_BITS,
};
