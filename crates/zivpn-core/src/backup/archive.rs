//! Archive Builder and extractor.
//!
//! Archives are flat zip files: every member is stored under its base name.
//! Both directions are best-effort per member; a single unreadable or
//! unwritable file is logged and skipped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};
use zivpn_traits::{AdminError, Result};

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Member names written to the archive.
    pub added: Vec<String>,
    /// Sources that were missing, not regular files, or unreadable.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtractReport {
    pub restored: Vec<PathBuf>,
    pub failed: usize,
}

/// Write every existing regular file in `sources` into a new archive at
/// `destination`.
pub fn build_archive(destination: &Path, sources: &[PathBuf]) -> Result<ArchiveReport> {
    let file = File::create(destination).map_err(|e| {
        AdminError::Archive(format!("cannot create {}: {}", destination.display(), e))
    })?;
    let mut writer = ZipWriter::new(file);
    let mut report = ArchiveReport::default();

    for source in sources {
        let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
            report.skipped.push(source.clone());
            continue;
        };
        match fs::metadata(source) {
            Ok(meta) if meta.is_file() => {}
            _ => {
                debug!(path = %source.display(), "Backup source absent, skipping");
                report.skipped.push(source.clone());
                continue;
            }
        }

        let contents = match fs::read(source) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Cannot read backup source, skipping");
                report.skipped.push(source.clone());
                continue;
            }
        };

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(file_mode(source));

        if let Err(e) = writer
            .start_file(name, options)
            .map_err(io::Error::other)
            .and_then(|_| writer.write_all(&contents))
        {
            warn!(path = %source.display(), error = %e, "Cannot add file to archive, skipping");
            report.skipped.push(source.clone());
            continue;
        }
        report.added.push(name.to_string());
    }

    writer
        .finish()
        .map_err(|e| AdminError::Archive(format!("cannot finish {}: {}", destination.display(), e)))?;
    Ok(report)
}

/// Unpack `archive` under `target_root`, overwriting existing files.
///
/// An archive that cannot be opened is `NotFound`. Per-member failures are
/// counted in the report.
pub fn extract_archive(archive: &Path, target_root: &Path) -> Result<ExtractReport> {
    let file = File::open(archive)
        .map_err(|_| AdminError::NotFound(format!("Backup archive {}", archive.display())))?;
    let mut zip = ZipArchive::new(file).map_err(|e| {
        AdminError::NotFound(format!("Readable backup archive {} ({})", archive.display(), e))
    })?;

    let mut report = ExtractReport::default();
    for index in 0..zip.len() {
        let mut entry = match zip.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index, error = %e, "Cannot open archive member, skipping");
                report.failed += 1;
                continue;
            }
        };
        let Some(relative) = entry.enclosed_name() else {
            warn!(name = entry.name(), "Archive member escapes restore root, skipping");
            report.failed += 1;
            continue;
        };
        let destination = target_root.join(relative);

        if entry.is_dir() {
            let mode = entry.unix_mode().unwrap_or(DEFAULT_DIR_MODE);
            if let Err(e) = fs::create_dir_all(&destination).and_then(|_| set_mode(&destination, mode)) {
                warn!(path = %destination.display(), error = %e, "Cannot create directory");
                report.failed += 1;
            }
            continue;
        }

        if let Some(parent) = destination.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "Cannot create parent directory");
            report.failed += 1;
            continue;
        }

        let mode = entry.unix_mode().map(|m| m & 0o7777).unwrap_or(DEFAULT_FILE_MODE);
        let written = open_truncated(&destination, mode)
            .and_then(|mut out| io::copy(&mut entry, &mut out))
            .and_then(|_| set_mode(&destination, mode));
        match written {
            Ok(()) => report.restored.push(destination),
            Err(e) => {
                warn!(path = %destination.display(), error = %e, "Cannot restore file, skipping");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o7777)
        .unwrap_or(DEFAULT_FILE_MODE)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    DEFAULT_FILE_MODE
}

#[cfg(unix)]
fn open_truncated(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncated(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
