// ─── Runtime Asset Installer ───
// Reconciles a bundled runtime pack into a profile's install root.
//
// Library jars come only from the bundle. Pulling them from another
// launcher's runtime mixes library versions and the mod loader then fails
// at boot.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::BundleResolver;
use crate::core::profile::ServerProfile;

/// Bundle subdirectory → install-root destination. `indexes` is the odd one:
/// the game expects asset indexes under `assets/indexes`.
const BUNDLE_LAYOUT: [(&str, &[&str]); 4] = [
    ("versions", &["versions"]),
    ("libraries", &["libraries"]),
    ("natives", &["natives"]),
    ("indexes", &["assets", "indexes"]),
];

const SKELETON_DIRS: [&[&str]; 4] = [
    &["versions"],
    &["libraries"],
    &["natives"],
    &["assets", "indexes"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeInstallOutcome {
    /// Markers and `libraries/` were already present; nothing was touched.
    AlreadyInstalled { custom_id: String },
    /// The bundle was merged into the root.
    Installed {
        custom_id: String,
        bundle: PathBuf,
        files_copied: usize,
    },
}

/// `versions/<id>/<id>.json` and `versions/<id>/<id>.jar`.
pub fn runtime_markers(root: &Path, custom_id: &str) -> [PathBuf; 2] {
    let version_dir = root.join("versions").join(custom_id);
    [
        version_dir.join(format!("{}.json", custom_id)),
        version_dir.join(format!("{}.jar", custom_id)),
    ]
}

/// First marker that does not exist, if any. Always checked against the
/// live filesystem because users edit their install roots between runs.
pub fn missing_marker(root: &Path, custom_id: &str) -> Option<PathBuf> {
    runtime_markers(root, custom_id)
        .into_iter()
        .find(|marker| !marker.exists())
}

/// Installed means both version markers plus the `libraries/` directory.
/// A root whose libraries were removed gets the bundle merged again.
pub fn is_installed(root: &Path, custom_id: &str) -> bool {
    missing_marker(root, custom_id).is_none() && root.join("libraries").is_dir()
}

/// Make sure the profile's custom build is present under its install root,
/// copying the bundled runtime pack over it when a marker is missing.
///
/// Files from the bundle overwrite same-path files; files that exist only
/// in the install root are left alone. A partially copied root is safe to
/// retry.
pub fn ensure_installed(
    profile: &ServerProfile,
    resolver: &BundleResolver,
) -> LauncherResult<RuntimeInstallOutcome> {
    let custom_id = profile.version.custom_id().ok_or_else(|| {
        LauncherError::Other(format!(
            "Profile '{}' is not a custom build; nothing to provision",
            profile.id
        ))
    })?;
    let provisioning = profile.runtime.as_ref().ok_or_else(|| {
        LauncherError::Other(format!(
            "Profile '{}' does not declare a runtime bundle",
            profile.id
        ))
    })?;
    let root = &profile.install_root;

    if is_installed(root, custom_id) {
        info!("Runtime {} already installed in {:?}", custom_id, root);
        return Ok(RuntimeInstallOutcome::AlreadyInstalled {
            custom_id: custom_id.to_string(),
        });
    }

    let bundle = resolver.resolve_bundle(&provisioning.bundle).ok_or_else(|| {
        LauncherError::RuntimeBundleMissing {
            bundle: provisioning.bundle.clone(),
            searched: resolver.bundle_candidates(&provisioning.bundle),
        }
    })?;

    info!("Installing runtime {} from {:?} into {:?}", custom_id, bundle, root);

    for parts in SKELETON_DIRS {
        let dir = parts.iter().fold(root.to_path_buf(), |acc, part| acc.join(part));
        std::fs::create_dir_all(&dir).map_err(|e| LauncherError::io(&dir, e))?;
    }

    let mut files_copied = 0;
    for (source_name, dest_parts) in BUNDLE_LAYOUT {
        let source = bundle.join(source_name);
        if !source.is_dir() {
            debug!("Bundle has no {}/ directory, skipping", source_name);
            continue;
        }
        let dest = dest_parts
            .iter()
            .fold(root.to_path_buf(), |acc, part| acc.join(part));
        let copied = merge_copy(&source, &dest)?;
        debug!("Merged {} files from {:?} into {:?}", copied, source, dest);
        files_copied += copied;
    }

    if let Some(missing) = missing_marker(root, custom_id) {
        return Err(LauncherError::RuntimeInstallIncomplete {
            root: root.clone(),
            missing,
        });
    }

    info!("Runtime {} installed ({} files)", custom_id, files_copied);
    Ok(RuntimeInstallOutcome::Installed {
        custom_id: custom_id.to_string(),
        bundle,
        files_copied,
    })
}

/// Recursive copy that overwrites same-path files and never removes
/// anything from `destination`. Returns the number of files written.
pub fn merge_copy(source: &Path, destination: &Path) -> LauncherResult<usize> {
    std::fs::create_dir_all(destination).map_err(|e| LauncherError::io(destination, e))?;

    let mut copied = 0;
    for entry in std::fs::read_dir(source).map_err(|e| LauncherError::io(source, e))? {
        let entry = entry.map_err(|e| LauncherError::io(source, e))?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| LauncherError::io(&src_path, e))?;

        if file_type.is_dir() {
            copied += merge_copy(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            std::fs::copy(&src_path, &dst_path).map_err(|e| LauncherError::io(&dst_path, e))?;
            copied += 1;
        }
    }

    Ok(copied)
}
