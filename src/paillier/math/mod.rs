// Réexporte toutes les structures et fonctions mathématiques

mod math;

pub use math::{
    l_function, gcd, generate_prime, is_probable_prime, mod_inverse, lcm,
    MIN_PRIME_BITS,
};
