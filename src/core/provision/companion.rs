// ─── Companion Asset Installer ───
// Deploys the client-side auth plugin into the designated profile's mods
// folder. Every failure here is recoverable: the game still boots without it.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::config::CompanionSettings;
use crate::core::error::LauncherError;
use crate::core::paths::BundleResolver;
use crate::core::profile::mods_dir_for;

#[derive(Debug)]
pub enum CompanionOutcome {
    /// The profile is not the one the plugin belongs to.
    NotApplicable,
    Installed { destination: PathBuf, bytes: u64 },
    /// Launch continues without the plugin; `reason` is always
    /// [`LauncherError::CompanionAssetInvalid`].
    Skipped { reason: LauncherError },
}

impl CompanionOutcome {
    fn skipped(message: String) -> Self {
        warn!("Companion skipped: {}", message);
        CompanionOutcome::Skipped {
            reason: LauncherError::CompanionAssetInvalid(message),
        }
    }
}

/// Copy the companion jar into `<install_root>/mods/`, replacing whatever is
/// already there. No version comparison: the deployed copy always wins.
pub fn ensure_companion(
    profile_id: &str,
    install_root: &Path,
    settings: &CompanionSettings,
    resolver: &BundleResolver,
) -> CompanionOutcome {
    if profile_id != settings.profile_id {
        return CompanionOutcome::NotApplicable;
    }

    let Some(source) = resolver.resolve(&settings.file_name) else {
        return CompanionOutcome::skipped(format!(
            "{} not found in {:?}",
            settings.file_name,
            resolver.roots()
        ));
    };

    let bytes = match std::fs::metadata(&source) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return CompanionOutcome::skipped(format!("cannot stat {:?}: {}", source, e));
        }
    };
    if bytes < settings.min_size_bytes {
        return CompanionOutcome::skipped(format!(
            "{:?} is only {} bytes (minimum {}), looks like a placeholder",
            source, bytes, settings.min_size_bytes
        ));
    }

    let mods_dir = mods_dir_for(install_root);
    if let Err(e) = std::fs::create_dir_all(&mods_dir) {
        return CompanionOutcome::skipped(format!("cannot create {:?}: {}", mods_dir, e));
    }

    let destination = mods_dir.join(&settings.file_name);
    match std::fs::copy(&source, &destination) {
        Ok(_) => {
            info!("Companion installed: {:?} -> {:?}", source, destination);
            CompanionOutcome::Installed { destination, bytes }
        }
        Err(e) => CompanionOutcome::skipped(format!(
            "copy {:?} -> {:?} failed: {}",
            source, destination, e
        )),
    }
}
