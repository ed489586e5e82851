// ─── Launch Configuration Builder ───
// Turns a profile plus a user's launch request into concrete parameters.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::config::MemoryLimits;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::{MemoryBounds, ProfileCatalog, ServerProfile};

/// One user action's worth of launch input. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(alias = "serverId")]
    pub profile_id: String,
    #[serde(default)]
    pub username: String,
    /// Requested heap ceiling in GiB; fractional values are rounded.
    /// Numeric strings are accepted, anything unparsable counts as absent.
    #[serde(default, deserialize_with = "deserialize_ram_gb")]
    pub ram_gb: Option<f64>,
    #[serde(default, alias = "accessToken", alias = "token")]
    pub identity_token: Option<String>,
}

/// Immutable, request-scoped launch parameters. `profile` is a copy; the
/// catalog entry it came from is never touched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchParams {
    pub profile: ServerProfile,
    pub username: String,
    pub identity_token: String,
    /// Profile base flags followed by the identity properties.
    pub jvm_args: Vec<String>,
}

impl LaunchParams {
    pub fn build(
        catalog: &ProfileCatalog,
        request: &LaunchRequest,
        limits: MemoryLimits,
    ) -> LauncherResult<Self> {
        let profile = catalog
            .get(&request.profile_id)
            .ok_or_else(|| LauncherError::ProfileNotFound(request.profile_id.clone()))?;

        let username = request.username.trim();
        if username.is_empty() {
            return Err(LauncherError::Validation("username is required".into()));
        }

        let mut profile = profile.clone();
        if let Some(ram_gb) = request.ram_gb.filter(|ram| ram.is_finite()) {
            profile.memory = apply_ram_request(&profile.memory, ram_gb, limits);
            debug!(
                "Memory for {}: min={} max={}",
                profile.id, profile.memory.min, profile.memory.max
            );
        }

        let identity_token = request.identity_token.clone().unwrap_or_default();
        let mut jvm_args = profile.base_jvm_args.clone();
        jvm_args.push(format!("-Donlyus.user={}", username));
        jvm_args.push(format!("-Donlyus.token={}", identity_token));

        Ok(Self {
            profile,
            username: username.to_string(),
            identity_token,
            jvm_args,
        })
    }
}

fn deserialize_ram_gb<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    let ram_gb = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(ram_gb.filter(|ram| ram.is_finite()))
}

/// Round, clamp into `limits`, then rewrite the ceiling. The floor is pulled
/// down to `max(1, ceiling - 1)` when it would exceed the new ceiling.
pub fn apply_ram_request(memory: &MemoryBounds, ram_gb: f64, limits: MemoryLimits) -> MemoryBounds {
    let low = i64::from(limits.min_gb);
    let high = i64::from(limits.max_gb_hard).max(low);
    let ceiling = (ram_gb.round() as i64).clamp(low, high);

    let mut bounds = memory.clone();
    bounds.max = format!("{}G", ceiling);
    if size_in_mib(&bounds.min).is_some_and(|min| min > ceiling * 1024) {
        bounds.min = format!("{}G", (ceiling - 1).max(1));
    }
    bounds
}

/// JVM size string in MiB: `"4G"` is 4096, `"512M"` is 512, a bare number
/// is bytes rounded down.
fn size_in_mib(size: &str) -> Option<i64> {
    let size = size.trim();
    let (digits, factor) = match size.chars().last()?.to_ascii_uppercase() {
        'G' => (&size[..size.len() - 1], 1024),
        'M' => (&size[..size.len() - 1], 1),
        'K' => return size[..size.len() - 1].parse::<i64>().ok().map(|k| k / 1024),
        _ => return size.parse::<i64>().ok().map(|b| b / (1024 * 1024)),
    };
    digits.parse::<i64>().ok().map(|value| value * factor)
}
