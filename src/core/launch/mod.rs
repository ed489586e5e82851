pub mod events;
pub mod params;
pub mod primitive;
pub mod process;
pub mod supervisor;

pub use events::{normalize_progress, LaunchObserver, ProgressEvent, RawProgress};
pub use params::{LaunchParams, LaunchRequest};
pub use primitive::{LaunchOptions, LaunchPrimitive, PrimitiveEvent, PrimitiveSender};
pub use process::JavaProcessLauncher;
pub use supervisor::{LaunchHandle, Launcher};
