// ─── Version File ───
// Reads a Mojang-format version JSON from an install root, resolves
// `inheritsFrom` chains and evaluates OS rules for libraries and arguments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenArtifact;

/// Forge and friends only ever nest one or two levels deep.
const MAX_INHERITANCE_DEPTH: usize = 8;

/// A parsed version JSON, after merging with its parents.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub inherits_from: Option<String>,
    /// Version whose jar the game boots from when this one ships no jar.
    #[serde(default)]
    pub jar: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    /// Pre-1.7 style asset index name.
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<serde_json::Value>,
    #[serde(default)]
    pub jvm: Vec<serde_json::Value>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<LibraryRule>>,
    #[serde(default)]
    pub natives: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryDownloads {
    pub artifact: Option<LibraryArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryArtifact {
    pub path: String,
}

// ─── OS Rule Evaluation ───

#[derive(Debug, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

impl LibraryEntry {
    /// Evaluate whether this library should be included for the current OS.
    ///
    /// No rules means allowed. Otherwise start disallowed and let every rule
    /// whose OS matches (or that names no OS) set the state; the last one wins.
    pub fn is_allowed_for_current_os(&self) -> bool {
        let rules = match &self.rules {
            Some(r) => r,
            None => return true,
        };

        let current_os = current_os_name();
        let mut allowed = false;

        for rule in rules {
            let os_matches = match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
                None => true,
                Some(name) => name == current_os,
            };

            if os_matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }

        allowed
    }

    /// Entries that only carry platform natives (LWJGL 2 style). Their jars
    /// are unpacked into the natives directory instead of joining the classpath.
    pub fn is_natives_only(&self) -> bool {
        self.natives.is_some()
            && self
                .downloads
                .as_ref()
                .and_then(|d| d.artifact.as_ref())
                .is_none()
    }

    /// Jar location relative to `libraries/`.
    pub fn local_path(&self) -> LauncherResult<PathBuf> {
        if let Some(artifact) = self.downloads.as_ref().and_then(|d| d.artifact.as_ref()) {
            if !artifact.path.trim().is_empty() {
                return Ok(PathBuf::from(&artifact.path));
            }
        }
        Ok(MavenArtifact::parse(&self.name)?.local_path())
    }
}

/// Get the Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

impl VersionJson {
    /// `versions/<id>/<id>.json` under `versions_dir`.
    pub fn path_for(versions_dir: &Path, id: &str) -> PathBuf {
        versions_dir.join(id).join(format!("{}.json", id))
    }

    /// Load `id` from `versions_dir`, folding in every `inheritsFrom` parent.
    pub fn load(versions_dir: &Path, id: &str) -> LauncherResult<Self> {
        let merged = load_merged_value(versions_dir, id, 0)?;
        Ok(serde_json::from_value(merged)?)
    }

    /// Asset index name, `legacy` when the JSON names none.
    pub fn asset_index_name(&self) -> &str {
        self.asset_index
            .as_ref()
            .map(|index| index.id.as_str())
            .or(self.assets.as_deref())
            .unwrap_or("legacy")
    }

    /// Game arguments with OS rules applied. Prefers the modern `arguments`
    /// block and falls back to the space-separated legacy string.
    pub fn simple_game_args(&self) -> Vec<String> {
        match &self.arguments {
            Some(args) if !args.game.is_empty() => {
                args.game.iter().flat_map(extract_argument_values).collect()
            }
            _ => match &self.minecraft_arguments {
                Some(s) => s.split_whitespace().map(|s| s.to_string()).collect(),
                None => vec![],
            },
        }
    }

    pub fn simple_jvm_args(&self) -> Vec<String> {
        match &self.arguments {
            Some(args) => args.jvm.iter().flat_map(extract_argument_values).collect(),
            None => vec![],
        }
    }

    /// Merge a child version over its parent. Scalar keys of the child win;
    /// `libraries` and `arguments.game`/`arguments.jvm` are concatenated
    /// with the child's entries first.
    pub fn merge_with_parent_json(
        current_json: &serde_json::Value,
        parent_json: &serde_json::Value,
    ) -> serde_json::Value {
        let mut merged = parent_json.clone();

        let Some(obj) = current_json.as_object() else {
            return merged;
        };

        for (k, v) in obj {
            match k.as_str() {
                "libraries" => {
                    merged[k] = concat_arrays(v, &parent_json[k]);
                }
                "arguments" => {
                    let mut arguments = parent_json[k].clone();
                    if !arguments.is_object() {
                        arguments = serde_json::json!({});
                    }
                    for side in ["game", "jvm"] {
                        let combined = concat_arrays(&v[side], &parent_json[k][side]);
                        if combined.as_array().is_some_and(|a| !a.is_empty()) {
                            arguments[side] = combined;
                        }
                    }
                    merged[k] = arguments;
                }
                _ => merged[k] = v.clone(),
            }
        }

        merged
    }
}

fn load_merged_value(versions_dir: &Path, id: &str, depth: usize) -> LauncherResult<serde_json::Value> {
    let path = VersionJson::path_for(versions_dir, id);
    if !path.is_file() {
        return Err(LauncherError::VersionMetadataMissing(path));
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| LauncherError::io(&path, e))?;
    let current: serde_json::Value = serde_json::from_str(&raw)?;
    if !current.is_object() {
        return Err(LauncherError::Other(format!("{:?} is not a version object", path)));
    }

    let Some(parent_id) = current.get("inheritsFrom").and_then(|v| v.as_str()) else {
        return Ok(current);
    };
    if depth >= MAX_INHERITANCE_DEPTH || parent_id == id {
        return Err(LauncherError::Other(format!(
            "Version {} has a cyclic or too deep inheritsFrom chain",
            id
        )));
    }

    debug!("Version {} inherits from {}", id, parent_id);
    let parent = load_merged_value(versions_dir, parent_id, depth + 1)?;
    Ok(VersionJson::merge_with_parent_json(&current, &parent))
}

fn concat_arrays(first: &serde_json::Value, second: &serde_json::Value) -> serde_json::Value {
    let mut items = first.as_array().cloned().unwrap_or_default();
    items.extend(second.as_array().cloned().unwrap_or_default());
    serde_json::Value::Array(items)
}

fn extract_argument_values(value: &serde_json::Value) -> Vec<String> {
    if let Some(arg) = value.as_str() {
        return vec![arg.to_string()];
    }

    let Some(obj) = value.as_object() else {
        return vec![];
    };

    if let Some(rules) = obj.get("rules").and_then(|r| r.as_array()) {
        if !rules_allow_current_os(rules) {
            return vec![];
        }
    }

    match obj.get("value") {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        _ => vec![],
    }
}

/// Same evaluation as library rules. Rules gated on launcher features
/// (demo mode, custom resolution) never match: none are enabled.
fn rules_allow_current_os(rules: &[serde_json::Value]) -> bool {
    let mut allowed = false;
    let current_os = current_os_name();

    for rule in rules {
        if rule.get("features").is_some() {
            continue;
        }

        let action = rule
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("disallow");

        let os_matches = match rule
            .get("os")
            .and_then(|os| os.get("name"))
            .and_then(|name| name.as_str())
        {
            None => true,
            Some(name) => name == current_os,
        };

        if os_matches {
            allowed = action == "allow";
        }
    }

    allowed
}
