use std::path::Path;

use tracing::{info, warn};

use super::model::{MemoryBounds, RuntimeProvisioning, ServerProfile, VersionSpec};
use crate::core::error::{LauncherError, LauncherResult};

pub const PROFILES_FILE: &str = "profiles.json";

const FORGE_1122_ID: &str = "forge-1.12.2-14.23.5.2864";
const FORGE_1710_ID: &str = "forge-1.7.10-10.13.4.1614-1.7.10";

/// Timeouts the auth/content servers need; the launch path re-checks them.
pub const NETWORK_TIMEOUT_JVM_ARGS: [&str; 2] = [
    "-Dsun.net.client.defaultConnectTimeout=600000",
    "-Dsun.net.client.defaultReadTimeout=600000",
];

/// Read-only set of profiles, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<ServerProfile>,
}

impl ProfileCatalog {
    pub fn new(profiles: Vec<ServerProfile>) -> Self {
        Self { profiles }
    }

    /// The two variants shipped with the launcher, rooted under `base_dir`.
    pub fn builtin(base_dir: &Path) -> Self {
        Self::new(vec![
            ServerProfile {
                id: "vanilla".into(),
                name: "Minecraft Vanilla".into(),
                install_root: base_dir.join("minecraft_vanilla"),
                version: VersionSpec::custom("1.12.2", FORGE_1122_ID),
                memory: MemoryBounds::new("2G", "4G"),
                base_jvm_args: forge_base_jvm_args(),
                runtime: Some(RuntimeProvisioning {
                    bundle: "vanilla-forge-1.12.2".into(),
                    lwjgl_version: "2.9.4-nightly-20150209".into(),
                }),
                server: None,
            },
            ServerProfile {
                id: "hitech".into(),
                name: "Minecraft Hi-Tech".into(),
                install_root: base_dir.join("minecraft_hitech"),
                version: VersionSpec::custom("1.7.10", FORGE_1710_ID),
                memory: MemoryBounds::new("2G", "6G"),
                base_jvm_args: forge_base_jvm_args(),
                runtime: None,
                server: None,
            },
        ])
    }

    /// Load `<base_dir>/profiles.json` when present, otherwise the built-ins.
    /// A file that cannot be parsed is reported and ignored.
    pub fn load_or_builtin(base_dir: &Path) -> Self {
        let path = base_dir.join(PROFILES_FILE);
        if !path.exists() {
            return Self::builtin(base_dir);
        }

        match Self::load_from_file(&path) {
            Ok(catalog) => {
                info!("Loaded {} profiles from {:?}", catalog.profiles.len(), path);
                catalog
            }
            Err(err) => {
                warn!("Ignoring {:?}: {}", path, err);
                Self::builtin(base_dir)
            }
        }
    }

    pub fn load_from_file(path: &Path) -> LauncherResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
        let profiles: Vec<ServerProfile> = serde_json::from_str(&raw)?;

        for profile in &profiles {
            if profile.id.trim().is_empty() {
                return Err(LauncherError::Other(format!(
                    "{:?} contains a profile without id",
                    path
                )));
            }
            if !profile.install_root.is_absolute() {
                return Err(LauncherError::Other(format!(
                    "Profile '{}' has a relative install root {:?}",
                    profile.id, profile.install_root
                )));
            }
        }

        Ok(Self::new(profiles))
    }

    pub fn get(&self, id: &str) -> Option<&ServerProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn profiles(&self) -> &[ServerProfile] {
        &self.profiles
    }
}

fn forge_base_jvm_args() -> Vec<String> {
    let mut args = vec![
        "-Dfml.ignoreInvalidMinecraftCertificates=true".to_string(),
        "-Dfml.ignorePatchDiscrepancies=true".to_string(),
    ];
    args.extend(NETWORK_TIMEOUT_JVM_ARGS.iter().map(|arg| arg.to_string()));
    args
}
