use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::crypto_error::CryptoError;
use crate::indistinguishability::{AdvancedMaskGenerator, BasicMaskGenerator, MaskGenerator, MAX_REDUNDANCY_FACTOR};
use crate::paillier::p_keygen::check_modulus_bits;

pub const DEFAULT_KEY_BITS: u64 = 2048;
pub const DEFAULT_REDUNDANCY_FACTOR: usize = 1;

const ADVANCED_NOISE_BITS: std::ops::RangeInclusive<u64> = 8..=256;

/// Stratégie de bruit, sérialisée `{"strategy": "basic"}` ou
/// `{"strategy": "advanced", "bits": 64}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum NoiseConfig {
    Basic,
    Advanced { bits: u64 },
}

impl NoiseConfig {
    pub fn build(&self) -> Arc<dyn MaskGenerator> {
        match *self {
            NoiseConfig::Basic => Arc::new(BasicMaskGenerator),
            NoiseConfig::Advanced { bits } => Arc::new(AdvancedMaskGenerator { bits }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DualMaskConfig {
    /// Taille du module n
    pub key_bits:          u64,
    pub redundancy_factor: usize,
    pub noise:             NoiseConfig,
}

impl Default for DualMaskConfig {
    fn default() -> Self {
        DualMaskConfig {
            key_bits:          DEFAULT_KEY_BITS,
            redundancy_factor: DEFAULT_REDUNDANCY_FACTOR,
            noise:             NoiseConfig::Basic,
        }
    }
}

impl DualMaskConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, CryptoError> {
        let config: DualMaskConfig = serde_json::from_str(raw)
            .map_err(|e| CryptoError::InvalidInput(format!("configuration : {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        check_modulus_bits(self.key_bits)?;
        if self.redundancy_factor > MAX_REDUNDANCY_FACTOR {
            return Err(CryptoError::InvalidInput(format!(
                "redundancy_factor {} > {MAX_REDUNDANCY_FACTOR}",
                self.redundancy_factor
            )));
        }
        if let NoiseConfig::Advanced { bits } = self.noise {
            if !ADVANCED_NOISE_BITS.contains(&bits) {
                return Err(CryptoError::InvalidInput(format!("bits de bruit {bits} hors de [8, 256]")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = DualMaskConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.key_bits, 2048);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = DualMaskConfig::from_json_str(r#"{"key_bits": 512}"#).unwrap();
        assert_eq!(cfg.key_bits, 512);
        assert_eq!(cfg.redundancy_factor, DEFAULT_REDUNDANCY_FACTOR);
        assert_eq!(cfg.noise, NoiseConfig::Basic);
    }

    #[test]
    fn test_advanced_noise_json() {
        let cfg = DualMaskConfig::from_json_str(
            r#"{"key_bits": 1024, "redundancy_factor": 0, "noise": {"strategy": "advanced", "bits": 64}}"#,
        )
        .unwrap();
        assert_eq!(cfg.noise, NoiseConfig::Advanced { bits: 64 });
        assert_eq!(cfg.noise.build().name(), "advanced");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            DualMaskConfig::from_json_str(r#"{"key_bits": 100}"#),
            Err(CryptoError::KeySizeTooSmall { requested: 100, .. })
        ));
        assert!(matches!(
            DualMaskConfig::from_json_str(r#"{"key_bits": 8192}"#),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            DualMaskConfig::from_json_str(r#"{"key_bits": 1025}"#),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(DualMaskConfig::from_json_str(r#"{"redundancy_factor": 99}"#).is_err());
        assert!(DualMaskConfig::from_json_str(r#"{"noise": {"strategy": "advanced", "bits": 1}}"#).is_err());
        // Aucun champ ne permet de choisir une branche
        assert!(DualMaskConfig::from_json_str(r#"{"key_type": "true"}"#).is_err());
    }
}
