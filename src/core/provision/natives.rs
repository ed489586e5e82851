// ─── Native Library Preparer ───
// LWJGL 2 ships its shared libraries inside `*-natives-<os>.jar` archives.
// The game expects them unpacked, flat, in `natives/<versionNumber>/`.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::archive::extract_by_suffix;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::ServerProfile;

/// Directory trees some natives jars leave behind when unpacked with a
/// non-flattening tool. Removed by exact name only.
const TRANSIENT_ARTIFACTS: [&str; 2] = ["META-INF", "org"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativePlatform {
    Windows,
    Linux,
    MacOs,
}

impl NativePlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            NativePlatform::Windows
        } else if cfg!(target_os = "macos") {
            NativePlatform::MacOs
        } else {
            NativePlatform::Linux
        }
    }

    /// Maven classifier used by LWJGL 2 natives jars.
    pub fn classifier(self) -> &'static str {
        match self {
            NativePlatform::Windows => "natives-windows",
            NativePlatform::Linux => "natives-linux",
            NativePlatform::MacOs => "natives-osx",
        }
    }

    pub fn library_suffix(self) -> &'static str {
        match self {
            NativePlatform::Windows => ".dll",
            NativePlatform::Linux => ".so",
            NativePlatform::MacOs => ".dylib",
        }
    }

    /// The file whose presence means natives are ready. The jars carry both
    /// 32 and 64-bit variants, so the base name is present on every arch.
    pub fn primary_library(self) -> &'static str {
        match self {
            NativePlatform::Windows => "lwjgl.dll",
            NativePlatform::Linux => "liblwjgl.so",
            NativePlatform::MacOs => "liblwjgl.dylib",
        }
    }
}

/// Everything needed to materialize one profile's natives directory.
#[derive(Debug, Clone)]
pub struct NativesPlan {
    pub natives_dir: PathBuf,
    pub archives: Vec<PathBuf>,
    pub primary: &'static str,
    pub suffix: &'static str,
}

impl NativesPlan {
    pub fn for_profile(profile: &ServerProfile, lwjgl_version: &str, platform: NativePlatform) -> Self {
        let lwjgl_dir = profile
            .libraries_dir()
            .join("org")
            .join("lwjgl")
            .join("lwjgl")
            .join(lwjgl_version);
        let classifier = platform.classifier();

        Self {
            natives_dir: profile.natives_dir(),
            archives: vec![
                lwjgl_dir.join(format!("lwjgl-{}-{}.jar", lwjgl_version, classifier)),
                lwjgl_dir.join(format!("lwjgl_util-{}-{}.jar", lwjgl_version, classifier)),
            ],
            primary: platform.primary_library(),
            suffix: platform.library_suffix(),
        }
    }

    pub fn primary_path(&self) -> PathBuf {
        self.natives_dir.join(self.primary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativesOutcome {
    AlreadyPresent,
    Extracted {
        count: usize,
        missing_archives: Vec<PathBuf>,
    },
}

/// Prepare natives for the current platform. Called right after the runtime
/// installer, so the natives jars are expected under `libraries/`.
pub fn ensure_natives(profile: &ServerProfile) -> LauncherResult<NativesOutcome> {
    let provisioning = profile.runtime.as_ref().ok_or_else(|| {
        LauncherError::Other(format!(
            "Profile '{}' does not declare an LWJGL version",
            profile.id
        ))
    })?;
    let plan = NativesPlan::for_profile(profile, &provisioning.lwjgl_version, NativePlatform::current());
    prepare_natives(&plan)
}

pub fn prepare_natives(plan: &NativesPlan) -> LauncherResult<NativesOutcome> {
    if plan.primary_path().exists() {
        debug!("{} already present in {:?}", plan.primary, plan.natives_dir);
        return Ok(NativesOutcome::AlreadyPresent);
    }

    info!("Extracting natives into {:?}", plan.natives_dir);
    let mut count = 0;
    let mut missing_archives = Vec::new();
    for archive in &plan.archives {
        if !archive.is_file() {
            warn!("Natives archive not found: {:?}", archive);
            missing_archives.push(archive.clone());
            continue;
        }
        let extracted = extract_by_suffix(archive, plan.suffix, &plan.natives_dir)?;
        debug!("Extracted {} natives from {:?}", extracted, archive);
        count += extracted;
    }

    if !plan.primary_path().exists() {
        return Err(LauncherError::NativesExtractionFailed {
            natives_dir: plan.natives_dir.clone(),
            primary: plan.primary.to_string(),
            extracted: count,
        });
    }

    remove_transient_artifacts(&plan.natives_dir);
    info!("Natives ready ({} files extracted)", count);
    Ok(NativesOutcome::Extracted {
        count,
        missing_archives,
    })
}

fn remove_transient_artifacts(natives_dir: &Path) {
    for name in TRANSIENT_ARTIFACTS {
        let path = natives_dir.join(name);
        if !path.is_dir() {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => debug!("Removed {:?}", path),
            Err(e) => warn!("Could not remove {:?}: {}", path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::test_support::write_zip;
    use crate::core::profile::ProfileCatalog;

    const LWJGL: &str = "2.9.4-nightly-20150209";

    fn windows_plan(base: &Path) -> (ServerProfile, NativesPlan) {
        let profile = ProfileCatalog::builtin(base).get("vanilla").unwrap().clone();
        let plan = NativesPlan::for_profile(&profile, LWJGL, NativePlatform::Windows);
        (profile, plan)
    }

    #[test]
    fn plan_points_at_lwjgl_natives_jars() {
        let (profile, plan) = windows_plan(Path::new("/data"));
        let lwjgl_dir = profile.install_root.join("libraries/org/lwjgl/lwjgl").join(LWJGL);

        assert_eq!(plan.natives_dir, profile.install_root.join("natives/1.12.2"));
        assert_eq!(
            plan.archives,
            vec![
                lwjgl_dir.join(format!("lwjgl-{LWJGL}-natives-windows.jar")),
                lwjgl_dir.join(format!("lwjgl_util-{LWJGL}-natives-windows.jar")),
            ]
        );
        assert_eq!(plan.primary, "lwjgl.dll");
    }

    #[test]
    fn extracts_from_available_archives() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());
        std::fs::create_dir_all(plan.archives[0].parent().unwrap()).unwrap();
        write_zip(
            &plan.archives[0],
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("lwjgl.dll", b"lwjgl"),
                ("lwjgl64.dll", b"lwjgl64"),
                ("OpenAL32.dll", b"al"),
            ],
        );

        let outcome = prepare_natives(&plan).unwrap();

        assert_eq!(
            outcome,
            NativesOutcome::Extracted {
                count: 3,
                missing_archives: vec![plan.archives[1].clone()],
            }
        );
        assert!(plan.natives_dir.join("lwjgl64.dll").exists());
        assert!(!plan.natives_dir.join("MANIFEST.MF").exists());
    }

    #[test]
    fn present_primary_short_circuits() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());
        std::fs::create_dir_all(&plan.natives_dir).unwrap();
        std::fs::write(plan.primary_path(), b"lwjgl").unwrap();

        assert_eq!(prepare_natives(&plan).unwrap(), NativesOutcome::AlreadyPresent);
    }

    #[test]
    fn missing_archives_fail_with_zero_count() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());

        let err = prepare_natives(&plan).unwrap_err();

        match err {
            LauncherError::NativesExtractionFailed { extracted, primary, .. } => {
                assert_eq!(extracted, 0);
                assert_eq!(primary, "lwjgl.dll");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn archive_without_primary_reports_count() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());
        std::fs::create_dir_all(plan.archives[1].parent().unwrap()).unwrap();
        write_zip(&plan.archives[1], &[("jinput-dx8.dll", b"jinput")]);

        let err = prepare_natives(&plan).unwrap_err();
        assert!(err.to_string().contains("extracted 1 files"));
    }

    #[test]
    fn cleanup_only_touches_known_names() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());
        std::fs::create_dir_all(plan.natives_dir.join("META-INF")).unwrap();
        std::fs::create_dir_all(plan.natives_dir.join("org/lwjgl")).unwrap();
        std::fs::create_dir_all(plan.natives_dir.join("organizer")).unwrap();
        std::fs::create_dir_all(plan.archives[0].parent().unwrap()).unwrap();
        write_zip(&plan.archives[0], &[("lwjgl.dll", b"lwjgl")]);

        prepare_natives(&plan).unwrap();

        assert!(!plan.natives_dir.join("META-INF").exists());
        assert!(!plan.natives_dir.join("org").exists());
        assert!(plan.natives_dir.join("organizer").exists());
        assert!(plan.primary_path().exists());
    }

    #[test]
    fn corrupt_archive_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let (_, plan) = windows_plan(temp.path());
        std::fs::create_dir_all(plan.archives[0].parent().unwrap()).unwrap();
        std::fs::write(&plan.archives[0], b"not a zip").unwrap();

        let err = prepare_natives(&plan).unwrap_err();
        assert!(matches!(err, LauncherError::Archive { .. }));
    }
}
