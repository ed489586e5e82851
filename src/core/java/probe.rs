// ─── Java Probe ───
// Answers "is there a usable java on this machine" for the UI.

use std::path::Path;

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Result of running `java -version`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct JavaCheck {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<u32>,
    /// Full `-version` output as printed by the JVM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run `<java> -version`. Never fails: a missing binary is reported as
/// `installed: false` with the spawn error.
#[instrument]
pub async fn check_java(java: &Path) -> JavaCheck {
    let output = match Command::new(java).arg("-version").output().await {
        Ok(output) => output,
        Err(e) => {
            warn!("Cannot run {:?}: {}", java, e);
            return JavaCheck {
                installed: false,
                error: Some(e.to_string()),
                ..JavaCheck::default()
            };
        }
    };

    // The JVM prints its banner on stderr.
    let raw = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );
    debug!("{:?} -version: {}", java, raw.lines().next().unwrap_or(""));

    let installed = output.status.success() || raw.to_ascii_lowercase().contains("version");
    let version = parse_version_string(&raw);
    let major = version.as_deref().map(parse_major_version);

    JavaCheck {
        installed,
        version,
        major,
        raw: Some(raw.trim_end().to_string()),
        error: if installed {
            None
        } else {
            Some(format!("java exited with {}", output.status))
        },
    }
}

/// First double-quoted token, e.g. `1.8.0_392` from
/// `java version "1.8.0_392"`.
pub fn parse_version_string(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let start = line.find('"')?;
        let end = line[start + 1..].find('"')?;
        Some(line[start + 1..start + 1 + end].to_string())
    })
}

/// `1.8.0_392` → 8, `17.0.8` → 17.
pub fn parse_major_version(version: &str) -> u32 {
    let mut parts = version.split(['.', '_', '-', '+']);
    let major: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    if major == 1 {
        parts.next().and_then(|s| s.parse().ok()).unwrap_or(major)
    } else {
        major
    }
}
