// ============================================================================
// Opérations homomorphes Paillier et interface HomomorphicCipher
//
//   E(a) · E(b)     mod n² = E(a + b)
//   E(a) · g^k      mod n² = E(a + k)
//   E(a)^k          mod n² = E(a · k)
//   E(a) · r^n      mod n² = E(a)        (re-randomisation)
//
// Les constantes k sont réduites mod n.
// ============================================================================

use num_bigint::BigUint;
use num_traits::One;
use rand_core::RngCore;
use crate::crypto_error::CryptoError;
use crate::paillier::p_decrypt::p_decrypt;
use crate::paillier::p_encrypt::{p_encrypt_with_rng, sample_unit};
use crate::paillier::p_keygen::{PublicKey, SecretKey};

pub fn homomorphic_add(c1: &BigUint, c2: &BigUint, pk: &PublicKey) -> BigUint {
    (c1 * c2) % &pk.n_squared
}

pub fn homomorphic_add_constant(c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint {
    let k = k % &pk.n;
    // g = n+1 : g^k mod n² = 1 + k·n
    let g_k = if pk.g == &pk.n + BigUint::one() {
        (BigUint::one() + &k * &pk.n) % &pk.n_squared
    } else {
        pk.g.modpow(&k, &pk.n_squared)
    };
    (c * &g_k) % &pk.n_squared
}

pub fn homomorphic_multiply_constant(c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint {
    let k = k % &pk.n;
    c.modpow(&k, &pk.n_squared)
}

pub fn rerandomize<R: RngCore + ?Sized>(
    c: &BigUint,
    pk: &PublicKey,
    rng: &mut R,
) -> Result<BigUint, CryptoError> {
    if c >= &pk.n_squared {
        return Err(CryptoError::CiphertextOutOfRange);
    }
    let r = sample_unit(&pk.n, rng);
    let r_n = r.modpow(&pk.n, &pk.n_squared);
    Ok((c * &r_n) % &pk.n_squared)
}

/// Interface étroite utilisée par la transformation et le pipeline.
///
/// `Paillier` en est l'unique implémentation ; le pipeline reçoit le chiffre
/// déjà construit et ne dépend que de ce trait.
pub trait HomomorphicCipher: Send + Sync {
    fn encrypt(&self, m: &BigUint, pk: &PublicKey, rng: &mut dyn RngCore) -> Result<BigUint, CryptoError>;

    fn decrypt(&self, c: &BigUint, pk: &PublicKey, sk: &SecretKey) -> Result<BigUint, CryptoError>;

    fn add(&self, c1: &BigUint, c2: &BigUint, pk: &PublicKey) -> BigUint;

    fn add_constant(&self, c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint;

    fn multiply_constant(&self, c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint;

    fn rerandomize(&self, c: &BigUint, pk: &PublicKey, rng: &mut dyn RngCore) -> Result<BigUint, CryptoError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Paillier;

impl HomomorphicCipher for Paillier {
    fn encrypt(&self, m: &BigUint, pk: &PublicKey, rng: &mut dyn RngCore) -> Result<BigUint, CryptoError> {
        p_encrypt_with_rng(m, pk, rng)
    }

    fn decrypt(&self, c: &BigUint, pk: &PublicKey, sk: &SecretKey) -> Result<BigUint, CryptoError> {
        p_decrypt(c, pk, sk)
    }

    fn add(&self, c1: &BigUint, c2: &BigUint, pk: &PublicKey) -> BigUint {
        homomorphic_add(c1, c2, pk)
    }

    fn add_constant(&self, c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint {
        homomorphic_add_constant(c, k, pk)
    }

    fn multiply_constant(&self, c: &BigUint, k: &BigUint, pk: &PublicKey) -> BigUint {
        homomorphic_multiply_constant(c, k, pk)
    }

    fn rerandomize(&self, c: &BigUint, pk: &PublicKey, rng: &mut dyn RngCore) -> Result<BigUint, CryptoError> {
        rerandomize(c, pk, rng)
    }
}
