// ─── Archive Entry Extractor ───
// Pulls entries out of zip/jar archives by file-name suffix.

use std::path::Path;

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Extract every file entry whose base name ends with `suffix`
/// (case-insensitive) directly into `dest_dir`, dropping the entry's
/// internal directories. Returns the number of files written.
///
/// Existing files with the same name are overwritten, so re-running the
/// extraction produces the same output.
pub fn extract_by_suffix(archive_path: &Path, suffix: &str, dest_dir: &Path) -> LauncherResult<usize> {
    let file = std::fs::File::open(archive_path).map_err(|source| LauncherError::Archive {
        path: archive_path.to_path_buf(),
        source: source.into(),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| LauncherError::Archive {
        path: archive_path.to_path_buf(),
        source,
    })?;

    std::fs::create_dir_all(dest_dir).map_err(|e| LauncherError::io(dest_dir, e))?;

    let suffix = suffix.to_ascii_lowercase();
    let mut extracted = 0;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| LauncherError::Archive {
                path: archive_path.to_path_buf(),
                source,
            })?;

        if entry.is_dir() {
            continue;
        }

        let Some(base_name) = entry_base_name(entry.name()) else {
            continue;
        };
        if !base_name.to_ascii_lowercase().ends_with(&suffix) {
            continue;
        }

        let dest = dest_dir.join(&base_name);
        let mut out = std::fs::File::create(&dest).map_err(|e| LauncherError::io(&dest, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&dest, e))?;
        debug!("Extracted {} -> {:?}", entry.name(), dest);
        extracted += 1;
    }

    Ok(extracted)
}

/// Last path component of a zip entry name. Entries using `\` separators
/// show up in archives built on Windows; `..` and empty names are rejected.
fn entry_base_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}
