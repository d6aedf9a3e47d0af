use anyhow::{Context, Result};
use creo_core::{BaseDirectory, PackageRecord};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::InstallError;

pub const DOWNLOADS_DIR: &str = "Downloads";
pub const BUILD_DIR: &str = "Build";
pub const CONTENT_DIR: &str = "Build/Content";
pub const VERSIONING_FILE: &str = "Versioning.txt";
pub const LOCAL_APP_FOLDER: &str = "NexusGames/Creo";
pub const APPLICATION_PATH: &str = "Application.exe";

/// Filesystem roots the launcher installs into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
    downloads_dir: PathBuf,
    build_dir: PathBuf,
    content_dir: PathBuf,
    local_app_dir: Option<PathBuf>,
    versioning_file: String,
    application_path: String,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            downloads_dir: root.join(DOWNLOADS_DIR),
            build_dir: root.join(BUILD_DIR),
            content_dir: root.join(CONTENT_DIR),
            local_app_dir: default_local_app_dir(LOCAL_APP_FOLDER),
            versioning_file: VERSIONING_FILE.to_string(),
            application_path: APPLICATION_PATH.to_string(),
            root,
        }
    }

    pub fn with_downloads_dir(mut self, relative: &str) -> Self {
        self.downloads_dir = self.root.join(relative);
        self
    }

    pub fn with_build_dir(mut self, relative: &str) -> Self {
        self.build_dir = self.root.join(relative);
        self
    }

    pub fn with_content_dir(mut self, relative: &str) -> Self {
        self.content_dir = self.root.join(relative);
        self
    }

    pub fn with_local_app_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_app_dir = Some(dir.into());
        self
    }

    pub fn with_versioning_file(mut self, name: &str) -> Self {
        self.versioning_file = name.to_string();
        self
    }

    pub fn with_application_path(mut self, relative: &str) -> Self {
        self.application_path = relative.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn local_app_dir(&self) -> Option<&Path> {
        self.local_app_dir.as_deref()
    }

    pub fn versioning_path(&self) -> PathBuf {
        self.downloads_dir.join(&self.versioning_file)
    }

    /// The game executable, relative to the build directory.
    pub fn application_path(&self) -> PathBuf {
        self.build_dir.join(&self.application_path)
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.downloads_dir)
            .with_context(|| format!("failed to create {}", self.downloads_dir.display()))?;
        Ok(())
    }

    pub fn base_dir_for(&self, record: &PackageRecord) -> Result<PathBuf, InstallError> {
        match record.base_directory() {
            BaseDirectory::Root => Ok(self.root.clone()),
            BaseDirectory::Build => Ok(self.build_dir.clone()),
            BaseDirectory::Content => Ok(self.content_dir.clone()),
            BaseDirectory::LocalAppData => {
                self.local_app_dir
                    .clone()
                    .ok_or_else(|| InstallError::LocalAppDataUnavailable {
                        package: record.title().to_string(),
                    })
            }
            BaseDirectory::Unrecognized(code) => Err(InstallError::InvalidBaseDirectory {
                package: record.title().to_string(),
                code,
            }),
        }
    }

    /// Where a package's download lands in the scratch directory.
    pub fn download_path_for(&self, record: &PackageRecord) -> Result<PathBuf, InstallError> {
        let relative = validated_relative_path(record, "download path", record.download_path())?;
        if relative.as_os_str().is_empty() {
            return Err(InstallError::InvalidPath {
                package: record.title().to_string(),
                field: "download path",
                path: String::new(),
                reason: "must not be empty",
            });
        }
        Ok(self.downloads_dir.join(relative))
    }

    /// `base/install_path`, or the base directory itself for an empty path.
    pub fn destination_for(&self, record: &PackageRecord) -> Result<PathBuf, InstallError> {
        let base = self.base_dir_for(record)?;
        let relative = validated_relative_path(record, "install path", record.install_path())?;
        if relative.as_os_str().is_empty() {
            return Ok(base);
        }
        Ok(base.join(relative))
    }
}

pub fn default_local_app_dir(folder: &str) -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(folder))
}

fn validated_relative_path<'a>(
    record: &PackageRecord,
    field: &'static str,
    path: &'a str,
) -> Result<&'a Path, InstallError> {
    let invalid = |reason| InstallError::InvalidPath {
        package: record.title().to_string(),
        field,
        path: path.to_string(),
        reason,
    };

    let relative = Path::new(path);
    if relative.is_absolute() || relative.has_root() {
        return Err(invalid("must be relative"));
    }
    if relative
        .components()
        .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid("must not include '..'"));
    }
    Ok(relative)
}
