use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version flavour: stock game or a prebuilt mod-loader profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Vanilla,
    Custom,
}

impl std::fmt::Display for VersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionKind::Vanilla => write!(f, "vanilla"),
            VersionKind::Custom => write!(f, "custom"),
        }
    }
}

/// `{ number, type, custom? }` as stored in profile definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionSpec {
    /// Base game version, e.g. `1.12.2`.
    pub number: String,
    #[serde(rename = "type")]
    pub kind: VersionKind,
    /// Version directory name of the mod-loader build, e.g.
    /// `forge-1.12.2-14.23.5.2864`.
    #[serde(default, alias = "customId", skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl VersionSpec {
    pub fn vanilla(number: &str) -> Self {
        Self {
            number: number.into(),
            kind: VersionKind::Vanilla,
            custom: None,
        }
    }

    pub fn custom(number: &str, custom_id: &str) -> Self {
        Self {
            number: number.into(),
            kind: VersionKind::Custom,
            custom: Some(custom_id.into()),
        }
    }

    /// The custom id when this is a custom build with a non-empty id.
    pub fn custom_id(&self) -> Option<&str> {
        match self.kind {
            VersionKind::Custom => self
                .custom
                .as_deref()
                .filter(|id| !id.trim().is_empty()),
            VersionKind::Vanilla => None,
        }
    }

    /// Name of the `versions/<id>` directory the game boots from.
    pub fn launch_id(&self) -> &str {
        self.custom_id().unwrap_or(&self.number)
    }
}

/// JVM heap bounds as human-readable sizes (`"2G"`, `"512M"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryBounds {
    pub min: String,
    pub max: String,
}

impl Default for MemoryBounds {
    fn default() -> Self {
        Self {
            min: "2G".into(),
            max: "4G".into(),
        }
    }
}

impl MemoryBounds {
    pub fn new(min: &str, max: &str) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }
}

/// Optional quick-join target passed to the client as `--server/--port`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_port() -> u16 {
    25565
}

/// How a custom build is provisioned from a bundled runtime pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeProvisioning {
    /// Directory name under `runtime/` in the asset roots.
    pub bundle: String,
    /// LWJGL release whose natives jars live under `libraries/org/lwjgl/lwjgl/<version>/`.
    pub lwjgl_version: String,
}

/// Static descriptor of one supported game variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerProfile {
    pub id: String,
    pub name: String,
    #[serde(alias = "root")]
    pub install_root: PathBuf,
    pub version: VersionSpec,
    #[serde(default)]
    pub memory: MemoryBounds,
    #[serde(default, alias = "jvmArgs")]
    pub base_jvm_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeProvisioning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerAddress>,
}

impl ServerProfile {
    pub fn libraries_dir(&self) -> PathBuf {
        self.install_root.join("libraries")
    }

    /// `natives/<versionNumber>`, where the game looks for shared libraries.
    pub fn natives_dir(&self) -> PathBuf {
        natives_dir_for(&self.install_root, &self.version.number)
    }

    /// Whether launching this profile goes through runtime-pack provisioning.
    pub fn needs_runtime_provisioning(&self) -> bool {
        self.version.custom_id().is_some() && self.runtime.is_some()
    }
}

pub fn natives_dir_for(root: &Path, version_number: &str) -> PathBuf {
    root.join("natives").join(version_number)
}

/// Plugin folder the companion artifact is deployed into.
pub fn mods_dir_for(root: &Path) -> PathBuf {
    root.join("mods")
}
