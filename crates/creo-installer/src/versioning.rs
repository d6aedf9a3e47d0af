use anyhow::{Context, Result};
use creo_core::VersionStore;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::InstallLayout;

/// Creates the scratch directory and seeds an empty versioning file.
pub fn prepare_installation(layout: &InstallLayout) -> Result<()> {
    layout.ensure_base_dirs()?;
    let path = layout.versioning_path();
    if !path.exists() {
        fs::write(&path, b"")
            .with_context(|| format!("failed to create versioning file: {}", path.display()))?;
    }
    Ok(())
}

pub fn read_local_store(layout: &InstallLayout) -> Result<VersionStore> {
    let path = layout.versioning_path();
    match fs::read_to_string(&path) {
        Ok(raw) => Ok(VersionStore::parse(&raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(VersionStore::new()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read versioning file: {}", path.display())),
    }
}

/// Rewrites the versioning file through a sibling temp file so a crash never
/// leaves it half written.
pub fn write_local_store(layout: &InstallLayout, store: &VersionStore) -> Result<PathBuf> {
    layout.ensure_base_dirs()?;

    let path = layout.versioning_path();
    let tmp_path = path.with_file_name(format!(
        "{}.tmp",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("versioning")
    ));
    fs::write(&tmp_path, store.serialize().as_bytes())
        .with_context(|| format!("failed to write versioning file: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, &path).with_context(|| {
        format!(
            "failed to replace versioning file {} with {}",
            path.display(),
            tmp_path.display()
        )
    })?;
    Ok(path)
}
