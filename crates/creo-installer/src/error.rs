use std::path::PathBuf;

use thiserror::Error;

/// Everything that can end an update run in `DownloadFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("failed to fetch '{resource}': {message}")]
    Fetch { resource: String, message: String },

    #[error("failed to install package '{package}': {message}")]
    Placement { package: String, message: String },

    #[error("package '{package}' uses unrecognized base directory code {code}")]
    InvalidBaseDirectory { package: String, code: u8 },

    #[error("package '{package}' has invalid {field} '{path}': {reason}")]
    InvalidPath {
        package: String,
        field: &'static str,
        path: String,
        reason: &'static str,
    },

    #[error("no local app data directory is available for package '{package}'")]
    LocalAppDataUnavailable { package: String },

    #[error("failed to record '{package}' as installed in {}: {message}", .path.display())]
    Checkpoint {
        package: String,
        path: PathBuf,
        message: String,
    },

    #[error("failed to read local versioning state {}: {message}", .path.display())]
    LocalState { path: PathBuf, message: String },

    #[error("update run cancelled before installing '{next}'")]
    Cancelled { next: String },

    #[error("failed to launch {}: {message}", .path.display())]
    Launch { path: PathBuf, message: String },
}

impl InstallError {
    /// Failures that happened while putting a downloaded package in place.
    pub fn is_placement_failure(&self) -> bool {
        matches!(
            self,
            Self::Placement { .. }
                | Self::InvalidBaseDirectory { .. }
                | Self::InvalidPath { .. }
                | Self::LocalAppDataUnavailable { .. }
        )
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
