use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand_core::{OsRng, RngCore};
use crate::paillier::p_keygen::PublicKey;
use crate::paillier::math::gcd;
use crate::crypto_error::CryptoError;

// ---------------------------------------------------------------------------
// Tire r uniformément dans Z*_n : r ∈ [1, n) et gcd(r, n) = 1
// ---------------------------------------------------------------------------
pub fn sample_unit<R: RngCore + ?Sized>(n: &BigUint, rng: &mut R) -> BigUint {
    loop {
        let candidate = rng.gen_biguint_range(&BigUint::one(), n);
        if gcd(&candidate, n) == BigUint::one() {
            break candidate;
        }
    }
}

// ---------------------------------------------------------------------------
// Chiffrement Paillier : c = g^m * r^n  mod n²
//
// Retourne Err(CryptoError::MessageOutOfRange) si m >= n.
// ---------------------------------------------------------------------------
pub fn p_encrypt(m: &BigUint, pk: &PublicKey) -> Result<BigUint, CryptoError> {
    let mut rng = OsRng;
    p_encrypt_with_rng(m, pk, &mut rng)
}

pub fn p_encrypt_with_rng<R: RngCore + ?Sized>(
    m: &BigUint,
    pk: &PublicKey,
    rng: &mut R,
) -> Result<BigUint, CryptoError> {
    if m >= &pk.n {
        return Err(CryptoError::MessageOutOfRange);
    }

    let r = sample_unit(&pk.n, rng);

    // g = n+1 : g^m mod n² = 1 + m·n
    let g_m = if pk.g == &pk.n + BigUint::one() {
        (BigUint::one() + m * &pk.n) % &pk.n_squared
    } else {
        pk.g.modpow(m, &pk.n_squared)
    };
    let r_n = r.modpow(&pk.n, &pk.n_squared);

    Ok((&g_m * &r_n) % &pk.n_squared)
}
