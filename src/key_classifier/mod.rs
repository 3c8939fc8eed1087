pub mod classifier;
pub mod key_material;

pub use classifier::{BranchClassifier, Sha256MajorityClassifier, FEATURE_COUNT};
pub use key_material::{
    derive_branch_keys, BranchKeys, KeyMaterial, BRANCH_KEY_LEN, MASTER_SEED_LEN,
    MAX_KEY_DERIVATION_ATTEMPTS,
};
