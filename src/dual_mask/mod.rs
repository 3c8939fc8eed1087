pub mod config;
pub mod dual_mask;

pub use config::{DualMaskConfig, NoiseConfig};
pub use dual_mask::{DualMaskCipher, Plaintext};
