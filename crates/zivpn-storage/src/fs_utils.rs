use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use zivpn_traits::{AdminError, Result};

#[cfg(unix)]
const DEFAULT_MODE: u32 = 0o644;

/// Replace `path` with `contents` via a sibling temp file and rename.
///
/// Readers see either the old or the new content, never a torn write. An
/// existing file's permissions carry over to the replacement.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp =
        NamedTempFile::new_in(parent).map_err(|e| AdminError::io("create temp file in", parent, e))?;
    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| AdminError::io("write", temp.path().to_path_buf(), e))?;

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(temp.path(), permissions)
            .map_err(|e| AdminError::io("set permissions on", temp.path().to_path_buf(), e))?;
    }

    temp.persist(path)
        .map_err(|e| AdminError::io("replace", path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(DEFAULT_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Read a small text file, trimmed. Missing file yields `None`.
pub fn read_trimmed(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AdminError::io("read", path, e)),
    }
}
