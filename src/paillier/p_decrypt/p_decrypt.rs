use num_bigint::BigUint;
use crate::paillier::math::l_function;
use crate::paillier::p_keygen::{PublicKey, SecretKey};
use crate::crypto_error::CryptoError;

// m = L(c^λ mod n²) · μ mod n
pub fn p_decrypt(c: &BigUint, pk: &PublicKey, sk: &SecretKey) -> Result<BigUint, CryptoError> {
    if c >= &pk.n_squared {
        return Err(CryptoError::CiphertextOutOfRange);
    }

    let c_lambda   = c.modpow(&sk.lambda, &pk.n_squared);
    let l_c_lambda = l_function(&c_lambda, &pk.n);

    Ok((&l_c_lambda * &sk.mu) % &pk.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::p_encrypt::p_encrypt;
    use crate::paillier::p_keygen::p_keygen_from_seed;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let kp = p_keygen_from_seed(512, &[11u8; 32]).unwrap();
        for m in [0u64, 1, 42, u64::MAX] {
            let m = BigUint::from(m);
            let c = p_encrypt(&m, &kp.public_key).unwrap();
            assert!(c < kp.public_key.n_squared);
            assert_eq!(p_decrypt(&c, &kp.public_key, &kp.secret_key).unwrap(), m);
        }
    }

    #[test]
    fn test_largest_message() {
        let kp = p_keygen_from_seed(512, &[12u8; 32]).unwrap();
        let m = &kp.public_key.n - BigUint::from(1u32);
        let c = p_encrypt(&m, &kp.public_key).unwrap();
        assert_eq!(p_decrypt(&c, &kp.public_key, &kp.secret_key).unwrap(), m);
    }

    #[test]
    fn test_out_of_range_inputs() {
        let kp = p_keygen_from_seed(512, &[13u8; 32]).unwrap();
        assert_eq!(
            p_encrypt(&kp.public_key.n, &kp.public_key),
            Err(CryptoError::MessageOutOfRange)
        );
        assert_eq!(
            p_decrypt(&kp.public_key.n_squared, &kp.public_key, &kp.secret_key),
            Err(CryptoError::CiphertextOutOfRange)
        );
    }

    #[test]
    fn test_encryption_is_probabilistic() {
        let kp = p_keygen_from_seed(512, &[14u8; 32]).unwrap();
        let m = BigUint::from(7u32);
        let c1 = p_encrypt(&m, &kp.public_key).unwrap();
        let c2 = p_encrypt(&m, &kp.public_key).unwrap();
        assert_ne!(c1, c2);
    }
}
