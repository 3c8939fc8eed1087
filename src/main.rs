// =========================================================
// Démonstration — masquage homomorphe à double texte clair
//
//   [1] un conteneur, deux clés, deux textes (HELLO / WORLD!)
//   [2] homomorphisme additif Paillier
//
// Niveau de traces réglable par RUST_LOG (ex. RUST_LOG=debug).
// =========================================================

use paillier_dualmask::paillier::p_decrypt::p_decrypt;
use paillier_dualmask::paillier::p_encrypt::p_encrypt;
use paillier_dualmask::paillier::p_homomorphic::homomorphic_add;
use paillier_dualmask::{CryptoError, DataType, DualMaskCipher, DualMaskConfig, Plaintext};

use num_bigint::RandBigInt;
use rand_core::OsRng;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::EnvFilter;

// Module réduit : la démonstration doit rester rapide
const DEMO_KEY_BITS: u64 = 1024;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let res = demonstration_double_masque().and_then(|_| demonstration_homomorphisme());
    if let Err(e) = res {
        error!(error = %e, "démonstration interrompue");
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────
// [1] Un conteneur, deux clés
// ─────────────────────────────────────────────────────────

fn demonstration_double_masque() -> Result<(), CryptoError> {
    println!("\n==============================================");
    println!("    Masquage double — Démonstration");
    println!("==============================================");

    let config = DualMaskConfig { key_bits: DEMO_KEY_BITS, ..DualMaskConfig::default() };
    let dm = DualMaskCipher::from_config(config)?;

    let t = Instant::now();
    let keys = dm.derive_keys(&[0u8; 32])?;
    let duree_keygen = t.elapsed();

    println!("\n  Clé A : {}…", &keys.true_key.to_hex()[..16]);
    println!("  Clé B : {}…", &keys.false_key.to_hex()[..16]);

    let t = Instant::now();
    let container = dm.encrypt(
        &keys.keypair.public_key,
        &Plaintext::new(DataType::Binary, b"HELLO".to_vec()),
        &Plaintext::new(DataType::Binary, b"WORLD!".to_vec()),
    )?;
    let bytes = container.to_json_bytes()?;
    let duree_enc = t.elapsed();

    println!("\n  Conteneur : {} chunks, {} octets JSON", container.chunks.len(), bytes.len());

    let t = Instant::now();
    let a = dm.decrypt(&bytes, keys.true_key.as_bytes())?;
    let b = dm.decrypt(&bytes, keys.false_key.as_bytes())?;
    let duree_dec = t.elapsed();

    println!("  Clé A → {:?}", String::from_utf8_lossy(&a.payload));
    println!("  Clé B → {:?}", String::from_utf8_lossy(&b.payload));

    println!("\n==============================================");
    println!("    RÉSUMÉ DES TEMPS — Masquage double");
    println!("==============================================");
    println!("  Dérivation des clés    : {:.3?}", duree_keygen);
    println!("  Chiffrement            : {:.3?}", duree_enc);
    println!("  Déchiffrement (×2)     : {:.3?}", duree_dec);
    println!("==============================================");

    Ok(())
}

// ─────────────────────────────────────────────────────────
// [2] Homomorphisme additif
// ─────────────────────────────────────────────────────────

fn demonstration_homomorphisme() -> Result<(), CryptoError> {
    let config = DualMaskConfig { key_bits: DEMO_KEY_BITS, ..DualMaskConfig::default() };
    let dm = DualMaskCipher::from_config(config)?;
    let kp = dm.derive_keys(&[1u8; 32])?.keypair;

    let mut rng      = OsRng;
    let m1           = rng.gen_biguint_below(&kp.public_key.n);
    let m2           = rng.gen_biguint_below(&kp.public_key.n);
    let somme_claire = (&m1 + &m2) % &kp.public_key.n;

    let c1      = p_encrypt(&m1, &kp.public_key)?;
    let c2      = p_encrypt(&m2, &kp.public_key)?;
    let c_somme = homomorphic_add(&c1, &c2, &kp.public_key);
    let dec     = p_decrypt(&c_somme, &kp.public_key, &kp.secret_key)?;

    if dec == somme_claire {
        println!("\n  Homomorphisme additif vérifié : D(E(m1)·E(m2)) = (m1+m2) mod n");
    } else {
        println!("\n  Erreur dans l'homomorphisme additif !");
    }
    Ok(())
}
