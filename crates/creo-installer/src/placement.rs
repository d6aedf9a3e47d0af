use anyhow::{anyhow, Context, Result};
use creo_core::PayloadKind;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs_utils::{move_file_or_copy, remove_file_if_exists};

/// Puts a downloaded package at its destination.
pub trait PackagePlacer {
    fn place(&self, downloaded: &Path, kind: PayloadKind, destination: &Path) -> Result<()>;
}

/// Zip archives are extracted over the destination (existing files are
/// overwritten) and then deleted; anything else is moved into place.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPlacer;

impl PackagePlacer for FsPlacer {
    fn place(&self, downloaded: &Path, kind: PayloadKind, destination: &Path) -> Result<()> {
        match kind {
            PayloadKind::Zip => {
                extract_zip(downloaded, destination)?;
                remove_file_if_exists(downloaded).with_context(|| {
                    format!("failed to delete extracted archive: {}", downloaded.display())
                })
            }
            PayloadKind::File => {
                let target = file_target(downloaded, destination)?;
                move_file_or_copy(downloaded, &target)
            }
        }
    }
}

pub(crate) fn extract_zip(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive: {}", archive_path.display()))?;

    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry {index} of {}",
                archive_path.display()
            )
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(anyhow!(
                "zip entry escapes the destination directory: {}",
                entry.name()
            ));
        };
        let target = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut out = fs::File::create(&target)
            .with_context(|| format!("failed to write {}", target.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {}", target.display()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))
                .with_context(|| format!("failed to set mode on {}", target.display()))?;
        }
    }

    Ok(())
}

/// A plain file moved onto an existing directory lands inside it.
fn file_target(downloaded: &Path, destination: &Path) -> Result<PathBuf> {
    if !destination.is_dir() {
        return Ok(destination.to_path_buf());
    }

    let file_name = downloaded
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("failed to derive file name of {}", downloaded.display()))?;
    Ok(destination.join(file_name))
}
