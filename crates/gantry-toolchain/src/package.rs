//! Zip packaging of compiled executables

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use gantry_core::ToolchainError;

use crate::Result;

/// Package `binary` into `archive`, replacing any previous archive.
///
/// The binary is stored under its file name.
pub fn zip_executable(binary: &Path, archive: &Path) -> Result<()> {
    if !binary.is_file() {
        return Err(ToolchainError::MissingArtifact(binary.to_path_buf()));
    }

    let entry_name = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ToolchainError::MissingArtifact(binary.to_path_buf()))?;

    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::remove_file(archive) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let archive_err = |e: zip::result::ZipError| ToolchainError::Archive {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    writer.start_file(entry_name, options).map_err(archive_err)?;

    let mut input = File::open(binary)?;
    io::copy(&mut input, &mut writer)?;
    writer.finish().map_err(archive_err)?;

    info!(archive = %archive.display(), "created archive");
    Ok(())
}

/// Remove `*.zip` files directly inside `dir`. A missing directory is fine.
pub fn clean_archives(dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_zip = path.extension().map(|ext| ext == "zip").unwrap_or(false);
        if entry.file_type()?.is_file() && is_zip {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed archive");
            removed += 1;
        }
    }

    Ok(removed)
}
