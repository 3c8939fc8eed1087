// ============================================================================
// Classifieur clé -> branche
//
// Fonction pure de la clé (et d'une métadonnée publique optionnelle). Aucun
// paramètre ne permet de forcer une branche, et aucune entrée n'est rejetée :
// toute clé reçoit une branche.
//
//   h  = SHA256(clé)
//   h2 = SHA256(h ‖ métadonnée)        (h2 = h sans métadonnée)
//   6 caractéristiques équilibrées tirées de h2 (et h)
//   > 3 vraies => True, < 3 => False, = 3 => bit bas de SHA256(tag ‖ h2 ‖ bits)
// ============================================================================

use sha2::{Digest, Sha256};
use crate::indistinguishability::metadata::Branch;

pub const FEATURE_COUNT: usize = 6;

const TIE_BREAK_DOMAIN: &[u8] = b"paillier-dualmask/tie-break";

pub trait BranchClassifier: Send + Sync {
    fn classify(&self, key: &[u8], metadata: Option<&[u8]>) -> Branch;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256MajorityClassifier;

impl Sha256MajorityClassifier {
    fn features(h: &[u8; 32], h2: &[u8; 32]) -> [bool; FEATURE_COUNT] {
        // Comparaison de quartets corrigée : a > b, ou a == b avec a impair
        // (120 + 8 cas sur 256 => exactement 1/2)
        let hi = h2[13] >> 4;
        let lo = h2[21] & 0x0f;
        let nibble = hi > lo || (hi == lo && hi & 1 == 1);

        let byte_sum: u32 = h2[24..28].iter().map(|&b| u32::from(b)).sum();

        [
            h2[0].count_ones() % 2 == 1,
            h2[5] & 0x80 != 0,
            (h2[9] ^ h2[17]) & 1 == 1,
            nibble,
            byte_sum & 1 == 1,
            (h2[30] ^ h[3]).count_ones() % 2 == 1,
        ]
    }

    fn tie_break(h2: &[u8; 32], features: &[bool; FEATURE_COUNT]) -> bool {
        let packed = features
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &f)| acc | (u8::from(f) << i));

        let mut hasher = Sha256::new();
        hasher.update(TIE_BREAK_DOMAIN);
        hasher.update(h2);
        hasher.update([packed]);
        hasher.finalize()[0] & 1 == 1
    }
}

impl BranchClassifier for Sha256MajorityClassifier {
    fn classify(&self, key: &[u8], metadata: Option<&[u8]>) -> Branch {
        let h: [u8; 32] = Sha256::digest(key).into();
        let h2: [u8; 32] = match metadata {
            Some(meta) => {
                let mut hasher = Sha256::new();
                hasher.update(h);
                hasher.update(meta);
                hasher.finalize().into()
            }
            None => h,
        };

        let features = Self::features(&h, &h2);
        let votes = features.iter().filter(|&&f| f).count();
        // Le départage est toujours calculé : même forme d'exécution pour toute clé
        let tie = Self::tie_break(&h2, &features);

        let is_true = match votes.cmp(&(FEATURE_COUNT / 2)) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less    => false,
            std::cmp::Ordering::Equal   => tie,
        };

        if is_true { Branch::True } else { Branch::False }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let c = Sha256MajorityClassifier;
        for key in [&b""[..], b"a", b"une cle plus longue", &[0u8; 64]] {
            assert_eq!(c.classify(key, None), c.classify(key, None));
            assert_eq!(c.classify(key, Some(b"meta")), c.classify(key, Some(b"meta")));
        }
    }

    #[test]
    fn test_both_branches_reachable() {
        let c = Sha256MajorityClassifier;
        let outputs: Vec<Branch> = (0u32..64).map(|i| c.classify(&i.to_be_bytes(), None)).collect();
        assert!(outputs.contains(&Branch::True));
        assert!(outputs.contains(&Branch::False));
    }

    #[test]
    fn test_metadata_changes_the_input() {
        // Sur 256 clés, la métadonnée doit modifier au moins une décision
        let c = Sha256MajorityClassifier;
        let differs = (0u32..256).any(|i| {
            let k = i.to_be_bytes();
            c.classify(&k, None) != c.classify(&k, Some(b"n"))
        });
        assert!(differs);
    }

    #[test]
    fn test_each_feature_is_balanced() {
        let mut counts = [0u32; FEATURE_COUNT];
        let total = 4096u32;
        for i in 0..total {
            let h: [u8; 32] = Sha256::digest(i.to_le_bytes()).into();
            let f = Sha256MajorityClassifier::features(&h, &h);
            for (slot, bit) in counts.iter_mut().zip(f) {
                *slot += u32::from(bit);
            }
        }
        for c in counts {
            // ±5 % autour de 2048
            assert!((1843..=2253).contains(&c), "caractéristique déséquilibrée : {c}");
        }
    }
}
