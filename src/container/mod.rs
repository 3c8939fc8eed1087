pub mod container;
pub mod container_storage;

pub use container::{Container, CONTAINER_FORMAT, CONTAINER_VERSION};
pub use container_storage::{
    biguint_to_hex, hex_to_biguint, container_to_json, json_to_container,
    ContainerJson, MetadataJson, PublicKeyJson, MAX_CONTAINER_BYTES, MAX_HEX_FIELD_LEN,
};
