pub mod probe;

pub use probe::{check_java, parse_major_version, JavaCheck};
