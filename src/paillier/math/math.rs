use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use num_integer::Integer;
use rand_core::RngCore;
use crate::crypto_error::CryptoError;

// Taille minimale d'un facteur premier (le module n en a le double)
pub const MIN_PRIME_BITS: u64 = 128;

// ---------------------------------------------------------------------------
// Table de petits premiers (crible préliminaire, couvre jusqu'à 2999)
// ---------------------------------------------------------------------------
const SMALL_PRIMES: &[u64] = &[
      3,   5,   7,  11,  13,  17,  19,  23,  29,  31,
     37,  41,  43,  47,  53,  59,  61,  67,  71,  73,
     79,  83,  89,  97, 101, 103, 107, 109, 113, 127,
    131, 137, 139, 149, 151, 157, 163, 167, 173, 179,
    181, 191, 193, 197, 199, 211, 223, 227, 229, 233,
    239, 241, 251, 257, 263, 269, 271, 277, 281, 283,
    293, 307, 311, 313, 317, 331, 337, 347, 349, 353,
    359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467,
    479, 487, 491, 499, 503, 509, 521, 523, 541, 547,
    557, 563, 569, 571, 577, 587, 593, 599, 601, 607,
    613, 617, 619, 631, 641, 643, 647, 653, 659, 661,
    673, 677, 683, 691, 701, 709, 719, 727, 733, 739,
    743, 751, 757, 761, 769, 773, 787, 797, 809, 811,
    821, 823, 827, 829, 839, 853, 857, 859, 863, 877,
    881, 883, 887, 907, 911, 919, 929, 937, 941, 947,
    953, 967, 971, 977, 983, 991, 997,1009,1013,1021,
   1031,1033,1039,1049,1051,1061,1063,1069,1087,1091,
   1093,1097,1103,1109,1117,1123,1129,1151,1153,1163,
   1171,1181,1187,1193,1201,1213,1217,1223,1229,1231,
   1237,1249,1259,1277,1279,1283,1289,1291,1297,1301,
   1303,1307,1319,1321,1327,1361,1367,1373,1381,1399,
   1409,1423,1427,1429,1433,1439,1447,1451,1453,1459,
   1471,1481,1483,1487,1489,1493,1499,1511,1523,1531,
   1543,1549,1553,1559,1567,1571,1579,1583,1597,1601,
   1607,1609,1613,1619,1621,1627,1637,1657,1663,1667,
   1669,1693,1697,1699,1709,1721,1723,1733,1741,1747,
   1753,1759,1777,1783,1787,1789,1801,1811,1823,1831,
   1847,1861,1867,1871,1873,1877,1879,1889,1901,1907,
   1913,1931,1933,1949,1951,1973,1979,1987,1993,1997,
   1999,2003,2011,2017,2027,2029,2039,2053,2063,2069,
   2081,2083,2087,2089,2099,2111,2113,2129,2131,2137,
   2141,2143,2153,2161,2179,2203,2207,2213,2221,2237,
   2239,2243,2251,2267,2269,2273,2281,2287,2293,2297,
   2309,2311,2333,2339,2341,2347,2351,2357,2371,2377,
   2381,2383,2389,2393,2399,2411,2417,2423,2437,2441,
   2447,2459,2467,2473,2477,2503,2521,2531,2539,2543,
   2549,2551,2557,2579,2591,2593,2609,2617,2621,2633,
   2647,2657,2659,2663,2671,2677,2683,2687,2689,2693,
   2699,2707,2711,2713,2719,2729,2731,2741,2749,2753,
   2767,2777,2789,2791,2797,2801,2803,2819,2833,2837,
   2843,2851,2857,2861,2879,2887,2897,2903,2909,2917,
   2927,2939,2953,2957,2963,2969,2971,2999,
];

// Fonction L(u) = (u-1)/n
pub fn l_function(u: &BigUint, n: &BigUint) -> BigUint {
    if u.is_zero() {
        return BigUint::zero();
    }
    (u - BigUint::one()) / n
}

// Calcule le pgcd de deux nombres
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

// ---------------------------------------------------------------------------
// Nombre de rounds Miller-Rabin (FIPS 186-4, table C.3, erreur < 2^-100)
// ---------------------------------------------------------------------------
fn miller_rabin_rounds(nbits: u64) -> u32 {
    match nbits {
        0..=255    => 40,
        256..=511  => 16,
        512..=1023 => 8,
        _          => 5,
    }
}

// ---------------------------------------------------------------------------
// Génère un premier d'exactement `nbits` bits par échantillonnage à rejet.
//
// Les deux bits de poids fort sont forcés à 1 : le produit de deux premiers
// de `nbits` bits a alors exactement 2·nbits bits.
//
// Le générateur est fourni par l'appelant : avec un ChaCha20Rng dérivé d'une
// graine, le résultat est entièrement déterministe (y compris les témoins
// Miller-Rabin).
// ---------------------------------------------------------------------------
pub fn generate_prime<R: RngCore + ?Sized>(nbits: u64, rng: &mut R) -> Result<BigUint, CryptoError> {
    if nbits < MIN_PRIME_BITS {
        return Err(CryptoError::KeySizeTooSmall {
            requested: nbits,
            minimum: MIN_PRIME_BITS,
        });
    }

    let rounds = miller_rabin_rounds(nbits);

    loop {
        let mut candidate = rng.gen_biguint(nbits);
        candidate.set_bit(nbits - 1, true);
        candidate.set_bit(nbits - 2, true);
        candidate.set_bit(0, true);

        if is_divisible_by_small_prime(&candidate) {
            continue;
        }

        if is_probable_prime(&candidate, rounds, rng) {
            debug_assert_eq!(candidate.bits(), nbits);
            return Ok(candidate);
        }
    }
}

// Vérifie si n est divisible par un des petits premiers de la table.
fn is_divisible_by_small_prime(n: &BigUint) -> bool {
    for &p in SMALL_PRIMES {
        let bp = BigUint::from(p);
        if n == &bp {
            return false;
        }
        if (n % &bp).is_zero() {
            return true;
        }
    }
    false
}

pub fn is_probable_prime<R: RngCore + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    if n <= &BigUint::one() { return false; }
    if n == &BigUint::from(2u32) || n == &BigUint::from(3u32) { return true; }
    if n.is_even() { return false; }
    for &p in SMALL_PRIMES {
        if n == &BigUint::from(p) { return true; }
    }
    if n < &BigUint::from(5u32) { return false; }

    let n_minus_1 = n - BigUint::one();
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(
            &BigUint::from(2u32),
            &(n - BigUint::from(2u32)),
        );
        let mut x = a.modpow(&d, n);
        if x == BigUint::one() || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 0..r.saturating_sub(1) {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

// Inverse de a modulo n via l'Euclide étendu de num-integer.
// Err(CryptoError::NoModularInverse) si gcd(a, n) != 1 ou n = 0.
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Result<BigUint, CryptoError> {
    if n.is_zero() {
        return Err(CryptoError::NoModularInverse);
    }
    let modulus = BigInt::from(n.clone());
    let egcd = BigInt::from(a.clone()).extended_gcd(&modulus);
    if !egcd.gcd.is_one() {
        return Err(CryptoError::NoModularInverse);
    }
    egcd.x.mod_floor(&modulus).to_biguint().ok_or(CryptoError::NegativeConversion)
}

pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    (a * b) / gcd(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_mod_inverse_small() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(11u32)).unwrap();
        assert_eq!(inv, BigUint::from(4u32));
    }

    #[test]
    fn test_mod_inverse_missing() {
        let res = mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32));
        assert_eq!(res, Err(CryptoError::NoModularInverse));
        assert_eq!(mod_inverse(&BigUint::from(3u32), &BigUint::zero()), Err(CryptoError::NoModularInverse));
    }

    #[test]
    fn test_lcm_and_l_function() {
        assert_eq!(lcm(&BigUint::from(4u32), &BigUint::from(6u32)), BigUint::from(12u32));
        assert_eq!(l_function(&BigUint::from(36u32), &BigUint::from(5u32)), BigUint::from(7u32));
    }

    #[test]
    fn test_probable_prime_known_values() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        // 2^127 - 1 est premier de Mersenne
        let m127 = (BigUint::one() << 127u32) - BigUint::one();
        assert!(is_probable_prime(&m127, 16, &mut rng));
        assert!(!is_probable_prime(&(&m127 + BigUint::from(2u32)), 16, &mut rng));
        assert!(!is_probable_prime(&BigUint::from(561u32), 16, &mut rng)); // Carmichael
    }

    #[test]
    fn test_generate_prime_is_deterministic_with_seed() {
        let mut a = ChaCha20Rng::from_seed([1u8; 32]);
        let mut b = ChaCha20Rng::from_seed([1u8; 32]);
        let p1 = generate_prime(128, &mut a).unwrap();
        let p2 = generate_prime(128, &mut b).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.bits(), 128);
    }

    #[test]
    fn test_generate_prime_rejects_small_sizes() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        assert!(matches!(
            generate_prime(64, &mut rng),
            Err(CryptoError::KeySizeTooSmall { .. })
        ));
    }
}
