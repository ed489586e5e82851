use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::paths::default_game_base_dir;

pub const CONFIG_FILE: &str = "launcher_config.json";

/// Closed range the requested heap ceiling is clamped into, in GiB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLimits {
    pub min_gb: u32,
    pub max_gb_hard: u32,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            min_gb: 2,
            max_gb_hard: 16,
        }
    }
}

/// Where the client-side auth plugin comes from and which profile gets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanionSettings {
    pub profile_id: String,
    pub file_name: String,
    /// Anything smaller is a placeholder, not a real jar.
    pub min_size_bytes: u64,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            profile_id: "vanilla".into(),
            file_name: "OnlyUsAuth-1.0.0.jar".into(),
            min_size_bytes: 10 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LauncherConfig {
    /// Parent of every built-in profile's install root.
    pub game_base_dir: Option<PathBuf>,
    /// Searched before the built-in asset locations.
    pub asset_roots: Vec<PathBuf>,
    pub memory_limits: MemoryLimits,
    pub companion: CompanionSettings,
    /// Java binary to launch with; `java` from `PATH` when unset.
    pub java_path: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            game_base_dir: None,
            asset_roots: Vec::new(),
            memory_limits: MemoryLimits::default(),
            companion: CompanionSettings::default(),
            java_path: None,
        }
    }
}

impl LauncherConfig {
    /// Read `<base_dir>/launcher_config.json`, falling back to defaults.
    pub fn load(base_dir: &Path) -> Self {
        let mut config = load_config_from_disk(base_dir).unwrap_or_default();
        if config.game_base_dir.is_none() {
            config.game_base_dir = Some(base_dir.to_path_buf());
        }
        config
    }

    pub fn base_dir(&self) -> PathBuf {
        self.game_base_dir
            .clone()
            .unwrap_or_else(default_game_base_dir)
    }

    pub fn java_binary(&self) -> PathBuf {
        self.java_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(java_exe()))
    }
}

fn load_config_from_disk(base_dir: &Path) -> Option<LauncherConfig> {
    let path = base_dir.join(CONFIG_FILE);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!("Corrupt {:?}, using defaults: {}", path, err);
            None
        }
    }
}

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_launcher_limits() {
        let config = LauncherConfig::default();
        assert_eq!(config.memory_limits.min_gb, 2);
        assert_eq!(config.memory_limits.max_gb_hard, 16);
        assert_eq!(config.companion.min_size_bytes, 10 * 1024);
        assert_eq!(config.companion.profile_id, "vanilla");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{ "memoryLimits": { "minGb": 1, "maxGbHard": 8 }, "javaPath": "/opt/jdk8/bin/java" }"#,
        )
        .unwrap();

        let config = LauncherConfig::load(temp.path());

        assert_eq!(config.memory_limits.max_gb_hard, 8);
        assert_eq!(config.java_binary(), PathBuf::from("/opt/jdk8/bin/java"));
        assert_eq!(config.companion, CompanionSettings::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), b"[1, 2").unwrap();

        let config = LauncherConfig::load(temp.path());

        assert_eq!(config.memory_limits, MemoryLimits::default());
        assert!(config.java_path.is_none());
        assert_eq!(config.base_dir(), temp.path());
    }
}
