//! Writing result files.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Path of a companion file: `path` with `suffix` appended to its name.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use polylang_migrator::output::companion_path;
///
/// assert_eq!(
///     companion_path(Path::new("out/site.xml"), ".attach.sql"),
///     PathBuf::from("out/site.xml.attach.sql")
/// );
/// ```
#[must_use]
pub fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write a file atomically.
///
/// Writes to a temp file next to the target, syncs to disk, then renames,
/// so an interrupted run never leaves a half-written file behind.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}
