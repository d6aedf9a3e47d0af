use std::process::Command;

use tracing::info;

use crate::error::InstallError;
use crate::fetch::PackageFetcher;
use crate::installer::{Installer, RunOutcome};
use crate::placement::PackagePlacer;
use crate::status::LaunchStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched { pid: u32 },
    /// The game was not ready, so an update check ran instead.
    CheckStarted(RunOutcome),
}

impl<F: PackageFetcher, P: PackagePlacer> Installer<F, P> {
    /// The primary action: start the game when it is ready and installed,
    /// otherwise run an update check.
    pub fn launch_if_ready(&self) -> Result<LaunchOutcome, InstallError> {
        let application = self.layout().application_path();
        if self.status() != LaunchStatus::Ready || !application.is_file() {
            info!(
                status = self.status().as_str(),
                application = %application.display(),
                "game not ready to launch; checking for updates"
            );
            return Ok(LaunchOutcome::CheckStarted(self.check_for_updates()));
        }

        let child = Command::new(&application)
            .current_dir(self.layout().build_dir())
            .spawn()
            .map_err(|err| InstallError::Launch {
                path: application.clone(),
                message: err.to_string(),
            })?;
        info!(pid = child.id(), application = %application.display(), "game launched");
        Ok(LaunchOutcome::Launched { pid: child.id() })
    }
}
