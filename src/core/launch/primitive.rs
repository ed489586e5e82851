// ─── Launch Primitive ───
// The seam between orchestration and whatever actually starts the game.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::auth::LaunchAccountProfile;
use crate::core::error::LauncherResult;
use crate::core::profile::{MemoryBounds, ServerAddress, VersionSpec};

use super::events::RawProgress;

/// Everything a primitive reports while it prepares and runs the game.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveEvent {
    /// The primitive's own diagnostics.
    Debug(String),
    /// One line of game output.
    Data(String),
    Progress(RawProgress),
    /// The game process ended. `None` when it was killed by a signal.
    Close(Option<i32>),
}

pub type PrimitiveSender = mpsc::UnboundedSender<PrimitiveEvent>;

/// Fully prepared input for one game start.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub root: PathBuf,
    pub version: VersionSpec,
    pub memory: MemoryBounds,
    pub jvm_args: Vec<String>,
    pub account: LaunchAccountProfile,
    pub server: Option<ServerAddress>,
}

#[async_trait]
pub trait LaunchPrimitive: Send + Sync {
    /// Start the game. Returns once the process is running; output and the
    /// final `Close` keep arriving on `events`, and the primitive drops its
    /// sender after the process exits.
    async fn launch(&self, options: LaunchOptions, events: PrimitiveSender) -> LauncherResult<()>;
}
