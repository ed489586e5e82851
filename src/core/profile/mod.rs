pub mod catalog;
pub mod model;

pub use catalog::{ProfileCatalog, NETWORK_TIMEOUT_JVM_ARGS};
pub use model::{
    mods_dir_for, natives_dir_for, MemoryBounds, RuntimeProvisioning, ServerAddress, ServerProfile,
    VersionKind, VersionSpec,
};
