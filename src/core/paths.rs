// ─── Path Resolver ───
// Locates bundled assets across development and packaged layouts.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "OnlyUsLauncher";
const WINDOWS_ASCII_FALLBACK: &str = r"C:\OnlyUsData";
const RUNTIME_DIR: &str = "runtime";

/// Ordered list of asset roots. The first root containing the requested
/// entry wins; nothing is created or touched while resolving.
#[derive(Debug, Clone)]
pub struct BundleResolver {
    roots: Vec<PathBuf>,
}

impl BundleResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Standard search order: user-configured roots, then `assets/` next to
    /// the running executable, then packaged `resources/assets/`, then the
    /// source tree's `resources/assets/` for development builds.
    pub fn with_default_roots(extra_roots: &[PathBuf]) -> Self {
        let mut roots: Vec<PathBuf> = extra_roots.to_vec();

        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(exe_dir.join("assets"));
            roots.push(exe_dir.join("resources").join("assets"));
        }

        roots.push(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("resources")
                .join("assets"),
        );
        roots.dedup();

        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Return the first existing `<root>/<relative>` or `None`.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
    }

    /// Runtime bundles live under `runtime/<name>`.
    pub fn resolve_bundle(&self, name: &str) -> Option<PathBuf> {
        self.resolve(Path::new(RUNTIME_DIR).join(name))
    }

    /// Every path `resolve_bundle` would have probed, for diagnostics.
    pub fn bundle_candidates(&self, name: &str) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(RUNTIME_DIR).join(name))
            .collect()
    }
}

/// Base directory under which every profile's install root lives.
///
/// Windows installs default to `%LOCALAPPDATA%\OnlyUsLauncher`. Java tooling
/// of that era chokes on non-ASCII paths, so a user profile with such a name
/// falls back to `C:\OnlyUsData`.
pub fn default_game_base_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let local = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME);
        if !is_ascii_path(&local) {
            return PathBuf::from(WINDOWS_ASCII_FALLBACK);
        }
        return local;
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn is_ascii_path(path: &Path) -> bool {
    path.to_string_lossy().is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_returns_first_existing_candidate() {
        let dev = tempfile::tempdir().unwrap();
        let packaged = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(packaged.path().join("runtime/vanilla-forge-1.12.2")).unwrap();
        std::fs::create_dir_all(dev.path().join("runtime/vanilla-forge-1.12.2")).unwrap();

        let resolver =
            BundleResolver::new(vec![dev.path().to_path_buf(), packaged.path().to_path_buf()]);

        assert_eq!(
            resolver.resolve_bundle("vanilla-forge-1.12.2"),
            Some(dev.path().join("runtime/vanilla-forge-1.12.2"))
        );
    }

    #[test]
    fn resolve_skips_missing_roots() {
        let packaged = tempfile::tempdir().unwrap();
        std::fs::write(packaged.path().join("OnlyUsAuth-1.0.0.jar"), b"jar").unwrap();

        let resolver = BundleResolver::new(vec![
            PathBuf::from("/definitely/not/here"),
            packaged.path().to_path_buf(),
        ]);

        assert_eq!(
            resolver.resolve("OnlyUsAuth-1.0.0.jar"),
            Some(packaged.path().join("OnlyUsAuth-1.0.0.jar"))
        );
    }

    #[test]
    fn resolve_returns_none_without_side_effects() {
        let root = tempfile::tempdir().unwrap();
        let resolver = BundleResolver::new(vec![root.path().join("assets")]);

        assert!(resolver.resolve_bundle("missing").is_none());
        assert!(!root.path().join("assets").exists());
        assert_eq!(
            resolver.bundle_candidates("missing"),
            vec![root.path().join("assets/runtime/missing")]
        );
    }

    #[test]
    fn ascii_detection() {
        assert!(is_ascii_path(Path::new("/home/player/.local/share")));
        assert!(!is_ascii_path(Path::new("/home/игрок/.local/share")));
    }
}
