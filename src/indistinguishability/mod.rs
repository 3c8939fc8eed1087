pub mod metadata;
pub mod mask_generator;
pub mod rerandomize;
pub mod noise;
pub mod redundancy;
pub mod interleave;
pub mod transform;

pub use metadata::{Branch, IndistinguishabilityMetadata, MappingEntry, SHUFFLE_SEED_LEN};
pub use mask_generator::{AdvancedMaskGenerator, BasicMaskGenerator, MaskGenerator, BASIC_NOISE_BOUND};
pub use interleave::{deinterleave, expected_mapping, interleave, keyed_permutation};
pub use transform::{IndistinguishabilityTransform, MAX_REDUNDANCY_FACTOR};
