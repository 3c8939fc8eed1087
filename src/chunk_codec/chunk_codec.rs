// ============================================================================
// ChunkCodec — octets <-> entiers de largeur fixe
//
//   marqueur ‖ données  →  [chunk_0, …, chunk_k]  (big-endian, < 2^(8·chunk_size))
//
// Le dernier chunk est complété par des octets aléatoires NON NULS : une suite
// de zéros trahirait la frontière des données. La taille d'origine est
// conservée à part (par branche) et sert à tronquer au décodage.
// ============================================================================

use num_bigint::BigUint;
use rand::Rng;
use rand_core::RngCore;
use tracing::warn;
use crate::crypto_error::CryptoError;
use crate::paillier::p_keygen::PublicKey;

/// Marge entre la largeur d'un chunk et la taille de n.
pub const CHUNK_SAFETY_MARGIN_BITS: u64 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Text,
    Json,
    Csv,
    Binary,
}

impl DataType {
    pub const ALL: [DataType; 4] = [DataType::Text, DataType::Json, DataType::Csv, DataType::Binary];

    pub fn marker(&self) -> &'static [u8] {
        match self {
            DataType::Text   => b"TEXT:UTF8:",
            DataType::Json   => b"JSON:UTF8:",
            DataType::Csv    => b"CSV:UTF8:",
            DataType::Binary => b"BINARY:",
        }
    }

    /// Reconnaît le marqueur en tête de `bytes`.
    pub fn detect_marker(bytes: &[u8]) -> Option<DataType> {
        DataType::ALL
            .into_iter()
            .find(|t| bytes.starts_with(t.marker()))
    }

    fn validate_payload(&self, data: &[u8]) -> Result<(), CryptoError> {
        match self {
            DataType::Binary => Ok(()),
            DataType::Text | DataType::Csv => std::str::from_utf8(data)
                .map(|_| ())
                .map_err(|_| CryptoError::InvalidInput("données non UTF-8".into())),
            DataType::Json => serde_json::from_slice::<serde_json::Value>(data)
                .map(|_| ())
                .map_err(|e| CryptoError::InvalidInput(format!("JSON invalide : {e}"))),
        }
    }
}

/// (bits(n) - 64) / 8 octets par chunk.
pub fn chunk_size_for_modulus(n: &BigUint) -> usize {
    (n.bits().saturating_sub(CHUNK_SAFETY_MARGIN_BITS) / 8) as usize
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPlaintext {
    pub values:        Vec<BigUint>,
    /// Longueur marqueur compris, avant bourrage
    pub original_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPlaintext {
    /// None si aucun marqueur connu n'est présent
    pub data_type: Option<DataType>,
    pub payload:   Vec<u8>,
}

#[derive(Clone, Copy, Debug)]
pub struct ChunkCodec {
    chunk_size: usize,
}

impl ChunkCodec {
    pub fn new(chunk_size: usize) -> Result<Self, CryptoError> {
        if chunk_size == 0 {
            return Err(CryptoError::InvalidInput("taille de chunk nulle".into()));
        }
        Ok(ChunkCodec { chunk_size })
    }

    pub fn for_public_key(pk: &PublicKey) -> Result<Self, CryptoError> {
        ChunkCodec::new(chunk_size_for_modulus(&pk.n))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn encode<R: RngCore + ?Sized>(
        &self,
        data: &[u8],
        data_type: DataType,
        rng: &mut R,
    ) -> Result<EncodedPlaintext, CryptoError> {
        data_type.validate_payload(data)?;

        let marker = data_type.marker();
        let mut framed = Vec::with_capacity(marker.len() + data.len() + self.chunk_size);
        framed.extend_from_slice(marker);
        framed.extend_from_slice(data);
        let original_size = framed.len();

        let remainder = original_size % self.chunk_size;
        if remainder != 0 {
            for _ in remainder..self.chunk_size {
                framed.push(rng.gen_range(1..=u8::MAX));
            }
        }

        let values = framed
            .chunks(self.chunk_size)
            .map(BigUint::from_bytes_be)
            .collect();

        Ok(EncodedPlaintext { values, original_size })
    }

    pub fn decode(&self, values: &[BigUint], original_size: usize) -> DecodedPlaintext {
        // Les chunks au-delà de original_size ne sont que du bourrage
        let needed = original_size.div_ceil(self.chunk_size).min(values.len());
        let mut bytes = Vec::with_capacity(needed * self.chunk_size);
        let mut degraded = 0usize;

        for value in values.iter().take(needed) {
            match self.chunk_to_bytes(value) {
                Ok(block) => bytes.extend_from_slice(&block),
                Err(_) => {
                    degraded += 1;
                    bytes.extend(std::iter::repeat(0u8).take(self.chunk_size));
                }
            }
        }
        if degraded > 0 {
            warn!(degraded, "chunks hors largeur remplacés par des zéros");
        }

        bytes.truncate(original_size);

        match DataType::detect_marker(&bytes) {
            Some(t) => DecodedPlaintext {
                data_type: Some(t),
                payload:   bytes.split_off(t.marker().len()),
            },
            None => DecodedPlaintext { data_type: None, payload: bytes },
        }
    }

    /// Bloc big-endian de exactement `chunk_size` octets.
    pub fn chunk_to_bytes(&self, value: &BigUint) -> Result<Vec<u8>, CryptoError> {
        let raw = value.to_bytes_be();
        if raw.len() > self.chunk_size {
            return Err(CryptoError::ChunkDecode {
                expected: self.chunk_size,
                actual:   raw.len(),
            });
        }
        let mut block = vec![0u8; self.chunk_size - raw.len()];
        block.extend_from_slice(&raw);
        Ok(block)
    }

    /// Valeur de chunk entièrement aléatoire (bourrage de branche).
    pub fn random_chunk_value<R: RngCore + ?Sized>(&self, rng: &mut R) -> BigUint {
        let mut block = vec![0u8; self.chunk_size];
        rng.fill_bytes(&mut block);
        BigUint::from_bytes_be(&block)
    }

    /// Complète la liste la plus courte avec des chunks aléatoires : le nombre
    /// de chunks ne révèle pas quel texte est le plus long.
    pub fn equalize_chunk_counts<R: RngCore + ?Sized>(
        &self,
        a: &mut Vec<BigUint>,
        b: &mut Vec<BigUint>,
        rng: &mut R,
    ) {
        let target = a.len().max(b.len());
        while a.len() < target {
            a.push(self.random_chunk_value(rng));
        }
        while b.len() < target {
            b.push(self.random_chunk_value(rng));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::from_seed([42u8; 32])
    }

    #[test]
    fn test_chunk_size_for_modulus() {
        let n = (BigUint::from(1u32) << 511u32) + BigUint::from(1u32);
        assert_eq!(n.bits(), 512);
        assert_eq!(chunk_size_for_modulus(&n), 56);
    }

    #[test]
    fn test_encode_decode_lengths() {
        let codec = ChunkCodec::new(8).unwrap();
        let marker_len = DataType::Binary.marker().len();
        // vide, 1 octet, exactement un chunk, plusieurs chunks + reste
        for len in [0usize, 1, 8 - marker_len, 8 - marker_len + 8, 29] {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let enc = codec.encode(&data, DataType::Binary, &mut rng()).unwrap();
            assert_eq!(enc.original_size, marker_len + len);
            assert_eq!(enc.values.len(), (marker_len + len + 7) / 8);
            let dec = codec.decode(&enc.values, enc.original_size);
            assert_eq!(dec.data_type, Some(DataType::Binary));
            assert_eq!(dec.payload, data);
        }
    }

    #[test]
    fn test_padding_bytes_never_zero() {
        let codec = ChunkCodec::new(32).unwrap();
        let enc = codec.encode(b"abc", DataType::Text, &mut rng()).unwrap();
        let block = codec.chunk_to_bytes(&enc.values[0]).unwrap();
        assert!(block[enc.original_size..].iter().all(|&b| b != 0));
    }

    #[test]
    fn test_markers_are_exact() {
        let codec = ChunkCodec::new(64).unwrap();
        for (t, data) in [
            (DataType::Text, &b"bonjour"[..]),
            (DataType::Json, &b"{\"a\":1}"[..]),
            (DataType::Csv, &b"a,b\n1,2"[..]),
            (DataType::Binary, &[0u8, 255, 7][..]),
        ] {
            let enc = codec.encode(data, t, &mut rng()).unwrap();
            let block = codec.chunk_to_bytes(&enc.values[0]).unwrap();
            assert!(block.starts_with(t.marker()));
            let dec = codec.decode(&enc.values, enc.original_size);
            assert_eq!(dec.data_type, Some(t));
            assert_eq!(dec.payload, data);
        }
    }

    #[test]
    fn test_rejects_invalid_text_and_json() {
        let codec = ChunkCodec::new(16).unwrap();
        assert!(matches!(
            codec.encode(&[0xff, 0xfe], DataType::Text, &mut rng()),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            codec.encode(b"{pas du json", DataType::Json, &mut rng()),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_chunk_degrades_to_zeros() {
        let codec = ChunkCodec::new(4).unwrap();
        let good = BigUint::from_bytes_be(b"BINA");
        let bad = BigUint::from_bytes_be(&[1, 2, 3, 4, 5]);
        let dec = codec.decode(&[good, bad], 8);
        assert_eq!(dec.data_type, None);
        assert_eq!(dec.payload, b"BINA\0\0\0\0".to_vec());
        assert_eq!(
            codec.chunk_to_bytes(&BigUint::from_bytes_be(&[1, 2, 3, 4, 5])),
            Err(CryptoError::ChunkDecode { expected: 4, actual: 5 })
        );
    }

    #[test]
    fn test_unknown_marker_returns_raw_bytes() {
        let codec = ChunkCodec::new(8).unwrap();
        let v = BigUint::from_bytes_be(b"garbage!");
        let dec = codec.decode(&[v], 8);
        assert_eq!(dec.data_type, None);
        assert_eq!(dec.payload, b"garbage!".to_vec());
    }

    #[test]
    fn test_oversized_original_size_keeps_all_chunks() {
        let codec = ChunkCodec::new(8).unwrap();
        let v = BigUint::from_bytes_be(b"BINARY:x");
        let dec = codec.decode(&[v.clone()], usize::MAX);
        assert_eq!(dec.data_type, Some(DataType::Binary));
        assert_eq!(dec.payload, b"x".to_vec());

        let dec = codec.decode(&[BigUint::from(1u32)], usize::MAX);
        assert_eq!(dec.data_type, None);
        assert_eq!(dec.payload, vec![0, 0, 0, 0, 0, 0, 0, 1]);

        let dec = codec.decode(&[], usize::MAX);
        assert!(dec.payload.is_empty());
    }

    #[test]
    fn test_equalize_chunk_counts() {
        let codec = ChunkCodec::new(8).unwrap();
        let mut a = vec![BigUint::from(1u32)];
        let mut b = vec![BigUint::from(2u32), BigUint::from(3u32), BigUint::from(4u32)];
        codec.equalize_chunk_counts(&mut a, &mut b, &mut rng());
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
        assert_eq!(a[0], BigUint::from(1u32));
        assert!(a.iter().all(|v| v.bits() <= 64));
    }
}
