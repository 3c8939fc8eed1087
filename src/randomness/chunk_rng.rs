//! Générateurs indépendants par chunk.
//!
//! Aucun générateur global n'est partagé entre les chunks : chaque étape
//! (étiquette), chaque branche et chaque indice reçoit son propre
//! `ChaCha20Rng`, dont la graine est HMAC-SHA256(nonce, étiquette ‖ branche ‖ indice).
//! Le nonce est tiré d'OsRng une fois par appel, ou fixé pour les tests.

use hmac::{Hmac, Mac};
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use sha2::Sha256;
use zeroize::Zeroize;
use crate::crypto_error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

pub const NONCE_LEN: usize = 32;

pub struct ChunkRngSource {
    nonce: [u8; NONCE_LEN],
}

impl ChunkRngSource {
    /// Nonce frais tiré de l'entropie système.
    pub fn fresh() -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        ChunkRngSource { nonce }
    }

    /// Nonce fixé : chiffrement reproductible.
    pub fn from_nonce(nonce: [u8; NONCE_LEN]) -> Self {
        ChunkRngSource { nonce }
    }

    /// Générateur dédié à (étiquette, flux, indice).
    ///
    /// `stream` distingue les deux branches (0 et 1) ou les sous-flux d'une
    /// même étape ; deux triplets différents donnent des graines indépendantes.
    pub fn rng_for(&self, label: &[u8], stream: u8, index: u64) -> Result<ChaCha20Rng, CryptoError> {
        Ok(ChaCha20Rng::from_seed(self.derive(label, stream, index)?))
    }

    /// 32 octets dérivés, utilisés directement comme graine publique
    /// (ex. shuffle_seed du conteneur).
    pub fn derive(&self, label: &[u8], stream: u8, index: u64) -> Result<[u8; 32], CryptoError> {
        let mut mac = HmacSha256::new_from_slice(&self.nonce)
            .map_err(|_| CryptoError::InvalidInput("clé HMAC invalide".into()))?;
        mac.update(&(label.len() as u32).to_be_bytes());
        mac.update(label);
        mac.update(&[stream]);
        mac.update(&index.to_be_bytes());

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&mac.finalize().into_bytes());
        Ok(seed)
    }
}

impl Drop for ChunkRngSource {
    fn drop(&mut self) {
        self.nonce.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_triplet_same_stream() {
        let src = ChunkRngSource::from_nonce([5u8; NONCE_LEN]);
        let mut a = src.rng_for(b"encrypt", 0, 3).unwrap();
        let mut b = src.rng_for(b"encrypt", 0, 3).unwrap();
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_index_label_and_stream_separate_streams() {
        let src = ChunkRngSource::from_nonce([5u8; NONCE_LEN]);
        let base = src.derive(b"noise", 0, 0).unwrap();
        assert_ne!(base, src.derive(b"noise", 0, 1).unwrap());
        assert_ne!(base, src.derive(b"noise", 1, 0).unwrap());
        assert_ne!(base, src.derive(b"noisf", 0, 0).unwrap());
    }

    #[test]
    fn test_derive_is_hmac_keyed_by_raw_nonce() {
        let nonce = [0x3cu8; NONCE_LEN];
        let src = ChunkRngSource::from_nonce(nonce);

        let mut mac = HmacSha256::new_from_slice(&nonce).unwrap();
        mac.update(&7u32.to_be_bytes());
        mac.update(b"shuffle");
        mac.update(&[1]);
        mac.update(&42u64.to_be_bytes());
        let expected: [u8; 32] = mac.finalize().into_bytes().into();

        assert_eq!(src.derive(b"shuffle", 1, 42).unwrap(), expected);
    }

    #[test]
    fn test_fresh_sources_differ() {
        let a = ChunkRngSource::fresh();
        let b = ChunkRngSource::fresh();
        assert_ne!(a.derive(b"x", 0, 0).unwrap(), b.derive(b"x", 0, 0).unwrap());
    }
}
