//! Crash-safe file writes.
//!
//! Graph files and Result Ledgers are never overwritten in place: bytes go
//! to a hidden sibling file that is flushed to disk and then renamed over
//! the destination, so readers only ever observe the old or the new content.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Sibling temporary path used while writing `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Atomically replace `path` with `bytes`.
///
/// Parent directories are created as needed. On failure the staging file is
/// removed and `path` is left untouched.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let staging = staging_path(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&staging)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&staging, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(Error::io_with_path(e, path));
    }
    Ok(())
}
