mod error;
mod fetch;
mod fs_utils;
mod installer;
mod launch;
mod layout;
mod placement;
mod status;
mod versioning;

pub use error::InstallError;
pub use fetch::{
    join_url, HttpFetcher, PackageFetcher, DEFAULT_BASE_URL, DEFAULT_FETCH_ATTEMPTS,
    DEFAULT_TIMEOUT,
};
pub use installer::{
    Installer, RunOutcome, StatusHandle, INSTALLED_NOTICE, REMOTE_VERSIONING_FILE,
    REMOTE_VERSION_LABEL_FILE,
};
pub use launch::LaunchOutcome;
pub use layout::{
    default_local_app_dir, InstallLayout, APPLICATION_PATH, BUILD_DIR, CONTENT_DIR, DOWNLOADS_DIR,
    LOCAL_APP_FOLDER, VERSIONING_FILE,
};
pub use placement::{FsPlacer, PackagePlacer};
pub use status::{ColorHint, LaunchStatus, NullObserver, StatusObserver};
pub use versioning::{prepare_installation, read_local_store, write_local_store};
