pub mod p_homomorphic;

pub use p_homomorphic::{
    homomorphic_add, homomorphic_add_constant, homomorphic_multiply_constant, rerandomize,
    HomomorphicCipher, Paillier,
};
