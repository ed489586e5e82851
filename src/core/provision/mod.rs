pub mod companion;
pub mod natives;
pub mod runtime;

pub use companion::{ensure_companion, CompanionOutcome};
pub use natives::{ensure_natives, NativePlatform, NativesOutcome, NativesPlan};
pub use runtime::{ensure_installed, RuntimeInstallOutcome};
