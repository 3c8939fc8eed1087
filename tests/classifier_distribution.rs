// Équilibre statistique du classifieur sur des clés réalistes.
// Clés tirées d'un ChaCha20 à graine fixe : résultats reproductibles.

use paillier_dualmask::{Branch, BranchClassifier, Sha256MajorityClassifier};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

const SAMPLES: usize = 10_000;

fn count_true<I, K>(keys: I, metadata: Option<&[u8]>) -> (usize, usize)
where
    I: IntoIterator<Item = K>,
    K: AsRef<[u8]>,
{
    let classifier = Sha256MajorityClassifier;
    keys.into_iter().fold((0, 0), |(t, total), key| {
        let hit = classifier.classify(key.as_ref(), metadata) == Branch::True;
        (t + usize::from(hit), total + 1)
    })
}

fn random_keys(seed: u64, count: usize, len: impl Fn(&mut ChaCha20Rng) -> usize) -> Vec<Vec<u8>> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut key = vec![0u8; len(&mut rng)];
            rng.fill_bytes(&mut key);
            key
        })
        .collect()
}

/// Khi-deux à un degré de liberté, seuil p = 0.001.
fn assert_balanced(label: &str, trues: usize, total: usize) {
    let expected = total as f64 / 2.0;
    let chi2 = 2.0 * (trues as f64 - expected).powi(2) / expected;
    assert!(chi2 < 10.83, "{label} : {trues}/{total} (khi2 = {chi2:.2})");
}

#[test]
fn random_keys_split_evenly() {
    let keys = random_keys(1, SAMPLES, |rng| 1 + (rng.next_u32() % 128) as usize);
    let (trues, total) = count_true(&keys, None);
    assert!((4_800..=5_200).contains(&trues), "{trues}/{total}");
    assert_balanced("sans métadonnée", trues, total);
}

#[test]
fn metadata_keeps_the_split_even() {
    let keys = random_keys(2, SAMPLES, |_| 64);
    let modulus = [0xA5u8; 64];
    let (trues, total) = count_true(&keys, Some(&modulus));
    assert!((4_800..=5_200).contains(&trues), "{trues}/{total}");
}

#[test]
fn each_key_length_is_balanced() {
    for (i, len) in [1usize, 16, 32, 64, 100].into_iter().enumerate() {
        let keys = random_keys(10 + i as u64, 4_000, |_| len);
        let (trues, total) = count_true(&keys, None);
        assert_balanced(&format!("longueur {len}"), trues, total);
    }
}

#[test]
fn branch_words_in_key_names_carry_no_signal() {
    for word in ["true", "false", "vrai", "faux"] {
        let keys = (0..4_000).map(|i| format!("fixtures/{word}_key_{i:04}.bin"));
        let (trues, total) = count_true(keys, None);
        assert_balanced(word, trues, total);
    }
}

#[test]
fn single_bit_flips_decorrelate() {
    let classifier = Sha256MajorityClassifier;
    let keys = random_keys(3, 2_000, |_| 32);
    let mut same = 0usize;
    for key in &keys {
        let mut flipped = key.clone();
        flipped[0] ^= 1;
        if classifier.classify(key, None) == classifier.classify(&flipped, None) {
            same += 1;
        }
    }
    assert_balanced("bit inversé", same, keys.len());
}
