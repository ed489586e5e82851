use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Caller input ────────────────────────────────────
    #[error("Unknown profile: {0}")]
    ProfileNotFound(String),

    #[error("Invalid launch request: {0}")]
    Validation(String),

    // ── Provisioning ────────────────────────────────────
    #[error("Runtime bundle '{bundle}' not found (searched {searched:?})")]
    RuntimeBundleMissing {
        bundle: String,
        searched: Vec<PathBuf>,
    },

    #[error("Runtime bundle was copied into {root:?} but {missing:?} is still missing; check the bundle's versions/ content")]
    RuntimeInstallIncomplete { root: PathBuf, missing: PathBuf },

    #[error("Failed to prepare natives in {natives_dir:?}: {primary} not found after extraction (extracted {extracted} files)")]
    NativesExtractionFailed {
        natives_dir: PathBuf,
        primary: String,
        extracted: usize,
    },

    #[error("Companion artifact rejected: {0}")]
    CompanionAssetInvalid(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Cannot read archive {path:?}: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    // ── Launch ──────────────────────────────────────────
    #[error("Version metadata missing: {0:?}")]
    VersionMetadataMissing(PathBuf),

    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

// The `{ success, error }` launch result carries errors as plain strings.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natives_failure_message_carries_extracted_count() {
        let err = LauncherError::NativesExtractionFailed {
            natives_dir: PathBuf::from("/tmp/natives/1.12.2"),
            primary: "lwjgl.dll".into(),
            extracted: 0,
        };
        let message = err.to_string();
        assert!(message.contains("lwjgl.dll"));
        assert!(message.contains("extracted 0 files"));
    }

    #[test]
    fn serializes_as_display_string() {
        let err = LauncherError::Validation("username is empty".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Invalid launch request: username is empty\"");
    }
}
