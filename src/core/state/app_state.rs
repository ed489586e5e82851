use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::config::LauncherConfig;
use crate::core::launch::{JavaProcessLauncher, LaunchObserver, LaunchPrimitive, Launcher};
use crate::core::paths::{default_game_base_dir, BundleResolver};
use crate::core::profile::ProfileCatalog;

/// Everything a front-end needs to serve launch requests. Shared as
/// `Arc<Mutex<AppState>>`; the lock is held for the whole provisioning
/// phase, which serializes launches coming from one front-end.
pub struct AppState<P: LaunchPrimitive = JavaProcessLauncher> {
    pub config: LauncherConfig,
    pub catalog: ProfileCatalog,
    pub launcher: Launcher<P>,
    /// Profiles whose game process is still alive, with their start time.
    pub running_profiles: HashMap<String, DateTime<Utc>>,
}

impl AppState<JavaProcessLauncher> {
    /// State rooted at the platform default base directory.
    pub fn new(observer: LaunchObserver) -> Self {
        Self::with_base_dir(default_game_base_dir(), observer)
    }

    /// Load config and profiles from `base_dir` and wire the Java launcher.
    pub fn with_base_dir(base_dir: PathBuf, observer: LaunchObserver) -> Self {
        let config = LauncherConfig::load(&base_dir);
        let catalog = ProfileCatalog::load_or_builtin(&config.base_dir());
        let primitive = JavaProcessLauncher::new(config.java_binary());
        info!(
            "Launcher state ready: base={:?}, {} profiles",
            config.base_dir(),
            catalog.profiles().len()
        );
        Self::with_primitive(config, catalog, primitive, observer)
    }
}

impl<P: LaunchPrimitive> AppState<P> {
    pub fn with_primitive(
        config: LauncherConfig,
        catalog: ProfileCatalog,
        primitive: P,
        observer: LaunchObserver,
    ) -> Self {
        let resolver = BundleResolver::with_default_roots(&config.asset_roots);
        let launcher = Launcher::new(primitive, resolver, config.companion.clone(), observer);
        Self {
            config,
            catalog,
            launcher,
            running_profiles: HashMap::new(),
        }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.config.base_dir()
    }

    pub fn is_running(&self, profile_id: &str) -> bool {
        self.running_profiles.contains_key(profile_id)
    }
}
