pub mod version_file;

pub use version_file::{LibraryEntry, VersionJson};
