// Stratégies de tirage du bruit k injecté par c' = c · g^k mod n².

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand::Rng;
use rand_core::RngCore;

/// Borne exclusive du bruit "basique".
pub const BASIC_NOISE_BOUND: u64 = 1 << 16;

pub trait MaskGenerator: Send + Sync {
    /// k ∈ [1, n)
    fn sample(&self, n: &BigUint, rng: &mut dyn RngCore) -> BigUint;

    fn name(&self) -> &'static str;
}

/// Petit bruit k ∈ [1, 2^16).
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicMaskGenerator;

impl MaskGenerator for BasicMaskGenerator {
    fn sample(&self, n: &BigUint, rng: &mut dyn RngCore) -> BigUint {
        let k = BigUint::from(rng.gen_range(1..BASIC_NOISE_BOUND));
        if &k < n { k } else { BigUint::from(1u32) }
    }

    fn name(&self) -> &'static str {
        "basic"
    }
}

/// Bruit de `bits` bits, réduit mod n, jamais nul.
#[derive(Clone, Copy, Debug)]
pub struct AdvancedMaskGenerator {
    pub bits: u64,
}

impl MaskGenerator for AdvancedMaskGenerator {
    fn sample(&self, n: &BigUint, rng: &mut dyn RngCore) -> BigUint {
        loop {
            let k = rng.gen_biguint(self.bits) % n;
            if !k.is_zero() {
                return k;
            }
        }
    }

    fn name(&self) -> &'static str {
        "advanced"
    }
}
