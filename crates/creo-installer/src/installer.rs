use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use creo_core::{PackageRecord, VersionStore};
use creo_planner::{plan_with_table, PlanStep, SubsumptionTable};
use tracing::{info, warn};

use crate::error::InstallError;
use crate::fetch::PackageFetcher;
use crate::placement::{FsPlacer, PackagePlacer};
use crate::status::{ColorHint, LaunchStatus, NullObserver, StatusObserver};
use crate::versioning::{prepare_installation, read_local_store, write_local_store};
use crate::InstallLayout;

pub const REMOTE_VERSIONING_FILE: &str = "Versioning.txt";
pub const REMOTE_VERSION_LABEL_FILE: &str = "Version.txt";
pub const INSTALLED_NOTICE: &str = "Updates Installed!";

/// Result of one `check_for_updates` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run was in flight; nothing happened.
    AlreadyRunning,
    UpToDate,
    Installed {
        installed: Vec<String>,
    },
    /// The run ended in `DownloadFailed`. Packages in `checkpointed` were
    /// installed and recorded before the failure and stay installed.
    Failed {
        error: InstallError,
        checkpointed: Vec<String>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Installed { .. })
    }
}

#[derive(Debug)]
struct RunState {
    status: LaunchStatus,
    current_package: Option<PackageRecord>,
    in_flight: bool,
    version_label: Option<String>,
}

/// Read-only view of the installer state, cheap to clone and share with a
/// presentation thread.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    state: Arc<Mutex<RunState>>,
}

impl StatusHandle {
    pub fn status(&self) -> LaunchStatus {
        lock(&self.state).status
    }

    pub fn current_package(&self) -> Option<PackageRecord> {
        lock(&self.state).current_package.clone()
    }

    pub fn version_label(&self) -> Option<String> {
        lock(&self.state).version_label.clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).in_flight
    }
}

/// Drives check -> download -> place -> checkpoint, one package at a time.
pub struct Installer<F, P = FsPlacer> {
    layout: InstallLayout,
    fetcher: F,
    placer: P,
    table: SubsumptionTable,
    observer: Arc<dyn StatusObserver>,
    state: Arc<Mutex<RunState>>,
    cancel_requested: AtomicBool,
    remote_versioning_file: String,
    remote_version_label_file: Option<String>,
}

impl<F: PackageFetcher> Installer<F> {
    pub fn new(layout: InstallLayout, fetcher: F) -> Self {
        Self {
            layout,
            fetcher,
            placer: FsPlacer,
            table: SubsumptionTable::launcher_default(),
            observer: Arc::new(NullObserver),
            state: Arc::new(Mutex::new(RunState {
                status: LaunchStatus::CheckingForUpdates,
                current_package: None,
                in_flight: false,
                version_label: None,
            })),
            cancel_requested: AtomicBool::new(false),
            remote_versioning_file: REMOTE_VERSIONING_FILE.to_string(),
            remote_version_label_file: Some(REMOTE_VERSION_LABEL_FILE.to_string()),
        }
    }
}

impl<F: PackageFetcher, P: PackagePlacer> Installer<F, P> {
    pub fn with_placer<Q: PackagePlacer>(self, placer: Q) -> Installer<F, Q> {
        Installer {
            layout: self.layout,
            fetcher: self.fetcher,
            placer,
            table: self.table,
            observer: self.observer,
            state: self.state,
            cancel_requested: self.cancel_requested,
            remote_versioning_file: self.remote_versioning_file,
            remote_version_label_file: self.remote_version_label_file,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_subsumption_table(mut self, table: SubsumptionTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_remote_files(
        mut self,
        versioning_file: &str,
        version_label_file: Option<&str>,
    ) -> Self {
        self.remote_versioning_file = versioning_file.to_string();
        self.remote_version_label_file = version_label_file.map(str::to_string);
        self
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn status(&self) -> LaunchStatus {
        lock(&self.state).status
    }

    pub fn current_package(&self) -> Option<PackageRecord> {
        lock(&self.state).current_package.clone()
    }

    pub fn version_label(&self) -> Option<String> {
        lock(&self.state).version_label.clone()
    }

    /// Asks an in-flight run to stop before its next package. The package
    /// currently downloading or installing is allowed to finish.
    pub fn cancel(&self) {
        if lock(&self.state).in_flight {
            self.cancel_requested.store(true, Ordering::SeqCst);
        }
    }

    /// Re-runs the whole check after a failure.
    pub fn retry(&self) -> RunOutcome {
        self.check_for_updates()
    }

    /// Runs one full update cycle on the calling thread.
    ///
    /// Returns `AlreadyRunning` without side effects while another run is in
    /// flight.
    pub fn check_for_updates(&self) -> RunOutcome {
        if !self.try_begin_run() {
            info!("update check requested while a run is in flight; ignoring");
            return RunOutcome::AlreadyRunning;
        }

        let guard = RunGuard { state: &self.state };
        let mut checkpointed = Vec::new();
        let result = self.run(&mut checkpointed);
        let outcome = self.finish_run(result, checkpointed);
        drop(guard);
        outcome
    }

    fn try_begin_run(&self) -> bool {
        {
            let mut state = lock(&self.state);
            if state.in_flight {
                return false;
            }
            state.in_flight = true;
            state.status = LaunchStatus::CheckingForUpdates;
            state.current_package = None;
        }
        self.cancel_requested.store(false, Ordering::SeqCst);
        self.notify_status(LaunchStatus::CheckingForUpdates, None);
        true
    }

    fn run(&self, checkpointed: &mut Vec<String>) -> Result<(), InstallError> {
        let local_state_error = |err: anyhow::Error| InstallError::LocalState {
            path: self.layout.versioning_path(),
            message: format!("{err:#}"),
        };
        prepare_installation(&self.layout).map_err(local_state_error)?;
        let mut local = read_local_store(&self.layout).map_err(local_state_error)?;

        let remote_text = self
            .fetcher
            .fetch_text(&self.remote_versioning_file)
            .map_err(|err| self.fetch_error(&self.remote_versioning_file, err))?;
        let remote = VersionStore::parse(&remote_text);

        let plan = plan_with_table(&local, &remote, &self.table);
        if plan.is_empty() {
            info!(packages = remote.len(), "all packages are up to date");
            return Ok(());
        }

        info!(steps = plan.len(), packages = ?plan.titles(), "updates available");
        self.set_status(LaunchStatus::UpdateAvailable, None);

        for step in &plan.steps {
            if self.cancel_requested.load(Ordering::SeqCst) {
                return Err(InstallError::Cancelled {
                    next: step.package.title().to_string(),
                });
            }
            self.install_step(step, &mut local)?;
            checkpointed.push(step.package.title().to_string());
        }

        Ok(())
    }

    fn install_step(&self, step: &PlanStep, local: &mut VersionStore) -> Result<(), InstallError> {
        let package = &step.package;
        let title = package.title();

        lock(&self.state).current_package = Some(package.clone());
        self.set_status(
            LaunchStatus::DownloadingUpdate,
            Some(format!("Downloading {title}")),
        );

        let download_path = self.layout.download_path_for(package)?;
        self.fetcher
            .fetch_to_file(package.download_path(), &download_path)
            .map_err(|err| self.fetch_error(package.download_path(), err))?;

        self.set_status(LaunchStatus::Installing, Some(format!("Installing {title}")));
        let destination = self.layout.destination_for(package)?;
        if package.install_path().is_empty() {
            // A bare file lands inside the base directory, so it must exist.
            fs::create_dir_all(&destination).map_err(|err| InstallError::Placement {
                package: title.to_string(),
                message: format!("failed to create {}: {err}", destination.display()),
            })?;
        }
        self.placer
            .place(&download_path, package.payload_kind(), &destination)
            .map_err(|err| InstallError::Placement {
                package: title.to_string(),
                message: format!("{err:#}"),
            })?;
        info!(
            package = title,
            version = package.version(),
            destination = %destination.display(),
            "package placed"
        );

        local.merge(package.clone());
        for subsumed in &step.subsumed {
            local.merge(subsumed.clone());
        }
        write_local_store(&self.layout, local).map_err(|err| InstallError::Checkpoint {
            package: title.to_string(),
            path: self.layout.versioning_path(),
            message: format!("{err:#}"),
        })?;

        self.observer.on_package_installed(title);
        Ok(())
    }

    fn finish_run(
        &self,
        result: Result<(), InstallError>,
        checkpointed: Vec<String>,
    ) -> RunOutcome {
        match result {
            Ok(()) if checkpointed.is_empty() => {
                self.end_run(LaunchStatus::Ready);
                RunOutcome::UpToDate
            }
            Ok(()) => {
                self.refresh_version_label();
                self.end_run(LaunchStatus::Ready);
                self.observer.on_notice(INSTALLED_NOTICE, ColorHint::SUCCESS);
                RunOutcome::Installed {
                    installed: checkpointed,
                }
            }
            Err(error) => {
                warn!(error = %error, checkpointed = ?checkpointed, "update run failed");
                self.end_run(LaunchStatus::DownloadFailed);
                self.observer.on_error(&error.to_string());
                RunOutcome::Failed {
                    error,
                    checkpointed,
                }
            }
        }
    }

    fn end_run(&self, status: LaunchStatus) {
        {
            let mut state = lock(&self.state);
            state.status = status;
            state.current_package = None;
            state.in_flight = false;
        }
        self.notify_status(status, None);
    }

    fn refresh_version_label(&self) {
        let Some(file) = &self.remote_version_label_file else {
            return;
        };
        match self.fetcher.fetch_text(file) {
            Ok(text) => {
                let label = text.trim().to_string();
                if !label.is_empty() {
                    lock(&self.state).version_label = Some(label);
                }
            }
            Err(err) => warn!(error = %format!("{err:#}"), "failed to refresh version label"),
        }
    }

    fn set_status(&self, status: LaunchStatus, label: Option<String>) {
        lock(&self.state).status = status;
        self.notify_status(status, label);
    }

    fn notify_status(&self, status: LaunchStatus, label: Option<String>) {
        let label = label.unwrap_or_else(|| status.label().to_string());
        self.observer
            .on_status_changed(status, &label, status.color_hint());
    }

    fn fetch_error(&self, remote_path: &str, err: anyhow::Error) -> InstallError {
        InstallError::Fetch {
            resource: self.fetcher.describe(remote_path),
            message: format!("{err:#}"),
        }
    }
}

/// Clears the in-flight flag if a run unwinds before `end_run`.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.in_flight {
            warn!("update run ended without finishing; releasing it");
            state.in_flight = false;
            state.status = LaunchStatus::DownloadFailed;
            state.current_package = None;
        }
    }
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
