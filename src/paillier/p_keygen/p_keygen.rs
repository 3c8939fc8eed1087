use num_bigint::BigUint;
use num_traits::One;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use tracing::{debug, info};
use zeroize::Zeroize;
use crate::paillier::math::{l_function, gcd, lcm, mod_inverse, generate_prime};
use crate::crypto_error::CryptoError;

/// Plus petit module accepté (deux premiers de 128 bits).
pub const MIN_MODULUS_BITS: u64 = 256;

/// Plus grand module accepté (borne les champs hex du conteneur).
pub const MAX_MODULUS_BITS: u64 = 4096;

/// Nombre de tirages (p, q) avant d'abandonner avec KeyGenExhausted.
pub const MAX_KEYGEN_ATTEMPTS: u32 = 8;

// ============================================================================
// Clé publique Paillier — pas de données secrètes, pas de zeroize nécessaire
// ============================================================================
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub n:         BigUint,
    pub g:         BigUint,
    pub n_squared: BigUint,
}

impl PublicKey {
    /// Reconstruit la clé publique canonique (g = n+1) à partir de n.
    pub fn from_modulus(n: BigUint) -> Self {
        let g = &n + BigUint::one();
        let n_squared = &n * &n;
        PublicKey { n, g, n_squared }
    }

    /// Octets big-endian de n : métadonnée publique du conteneur.
    pub fn modulus_bytes(&self) -> Vec<u8> {
        self.n.to_bytes_be()
    }
}

// ============================================================================
// Helper : efface les octets internes d'un BigUint
// ============================================================================
fn zeroize_biguint(n: &mut BigUint) {
    let bits = n.bits() as usize;
    if bits > 0 {
        *n = BigUint::from_bytes_be(&vec![0u8; (bits + 7) / 8]);
    }
    *n = BigUint::default();
}

// ============================================================================
// Clé secrète Paillier — ZEROISÉE À LA DESTRUCTION
// ============================================================================
#[derive(Clone)]
pub struct SecretKey {
    pub lambda: BigUint,
    pub mu:     BigUint,
    pub p:      BigUint,
    pub q:      BigUint,
    pub n:      BigUint,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        zeroize_biguint(&mut self.lambda);
        zeroize_biguint(&mut self.mu);
        zeroize_biguint(&mut self.p);
        zeroize_biguint(&mut self.q);
        zeroize_biguint(&mut self.n);
    }
}

// Seule la taille du module apparaît dans les traces
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey({} bits)", self.n.bits())
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Paire de clés
// ============================================================================
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

// ============================================================================
// Génération de clés Paillier
//
// `modulus_bits` est la taille de n ; p et q ont chacun modulus_bits/2 bits.
//
// g = n+1 : (n+1)^m mod n² = 1 + m·n, donc
//   g^λ mod n² = 1 + λ·n  (une multiplication, pas de modpow)
//   L(g^λ mod n²) = λ mod n
// μ existe si et seulement si gcd(λ, n) = 1.
// ============================================================================
/// Taille de module acceptée : paire, dans [MIN_MODULUS_BITS, MAX_MODULUS_BITS].
pub fn check_modulus_bits(modulus_bits: u64) -> Result<(), CryptoError> {
    if modulus_bits < MIN_MODULUS_BITS {
        return Err(CryptoError::KeySizeTooSmall {
            requested: modulus_bits,
            minimum:   MIN_MODULUS_BITS,
        });
    }
    if modulus_bits > MAX_MODULUS_BITS || modulus_bits % 2 != 0 {
        return Err(CryptoError::InvalidInput(format!(
            "taille de module {modulus_bits} bits : paire et dans [{MIN_MODULUS_BITS}, {MAX_MODULUS_BITS}] attendue"
        )));
    }
    Ok(())
}

pub fn p_keygen(modulus_bits: u64) -> Result<KeyPair, CryptoError> {
    let mut rng = OsRng;
    p_keygen_with_rng(modulus_bits, &mut rng)
}

// Même graine => mêmes p, q => même paire de clés.
pub fn p_keygen_from_seed(modulus_bits: u64, seed: &[u8; 32]) -> Result<KeyPair, CryptoError> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    p_keygen_with_rng(modulus_bits, &mut rng)
}

pub fn p_keygen_with_rng<R: RngCore + ?Sized>(
    modulus_bits: u64,
    rng: &mut R,
) -> Result<KeyPair, CryptoError> {
    check_modulus_bits(modulus_bits)?;

    let prime_bits = modulus_bits / 2;

    for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
        let p = generate_prime(prime_bits, rng)?;
        let q = generate_prime(prime_bits, rng)?;
        if p == q {
            debug!(attempt, "p == q, nouveau tirage");
            continue;
        }

        match assemble_keypair(p, q) {
            Ok(kp) => {
                info!(modulus_bits = kp.public_key.n.bits(), attempt, "paire de clés Paillier générée");
                return Ok(kp);
            }
            Err(e) => debug!(attempt, error = %e, "paire rejetée, nouveau tirage"),
        }
    }

    Err(CryptoError::KeyGenExhausted { attempts: MAX_KEYGEN_ATTEMPTS })
}

fn assemble_keypair(p: BigUint, q: BigUint) -> Result<KeyPair, CryptoError> {
    let n         = &p * &q;
    let n_squared = &n * &n;

    let p_minus_1 = &p - BigUint::one();
    let q_minus_1 = &q - BigUint::one();

    let lambda = lcm(&p_minus_1, &q_minus_1);
    if gcd(&lambda, &n) != BigUint::one() {
        return Err(CryptoError::NoModularInverse);
    }

    let g = &n + BigUint::one();

    let g_lambda   = (BigUint::one() + &lambda * &n) % &n_squared;
    let l_g_lambda = l_function(&g_lambda, &n);
    let mu         = mod_inverse(&l_g_lambda, &n)?;

    Ok(KeyPair {
        public_key: PublicKey { n: n.clone(), g, n_squared },
        secret_key: SecretKey { lambda, mu, p, q, n },
    })
}
