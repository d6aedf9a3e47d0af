/// Launcher status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchStatus {
    Ready,
    CheckingForUpdates,
    UpdateAvailable,
    DownloadingUpdate,
    Installing,
    DownloadFailed,
}

impl LaunchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::CheckingForUpdates => "checking-for-updates",
            Self::UpdateAvailable => "update-available",
            Self::DownloadingUpdate => "downloading-update",
            Self::Installing => "installing",
            Self::DownloadFailed => "download-failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::CheckingForUpdates => "Checking for Updates..",
            Self::UpdateAvailable => "Update Available",
            Self::DownloadingUpdate => "Downloading Updates..",
            Self::Installing => "Installing Updates..",
            Self::DownloadFailed => "Download Failed!",
        }
    }

    /// Text for the primary action offered in this state.
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Ready => "Play Game",
            Self::UpdateAvailable => "Update Game",
            Self::DownloadFailed => "Retry Download",
            Self::CheckingForUpdates | Self::DownloadingUpdate | Self::Installing => "Waiting...",
        }
    }

    pub fn color_hint(self) -> Option<ColorHint> {
        match self {
            Self::Ready | Self::UpdateAvailable => None,
            Self::CheckingForUpdates => Some(ColorHint::CHECKING),
            Self::DownloadingUpdate | Self::Installing => Some(ColorHint::PROGRESS),
            Self::DownloadFailed => Some(ColorHint::FAILURE),
        }
    }

    /// Terminal states; a new check may only start from one of these.
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Ready | Self::DownloadFailed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHint {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ColorHint {
    pub const CHECKING: Self = Self::rgba(255, 235, 35, 40);
    pub const PROGRESS: Self = Self::rgba(89, 240, 33, 40);
    pub const FAILURE: Self = Self::rgba(240, 33, 33, 40);
    pub const SUCCESS: Self = Self::rgba(33, 163, 37, 255);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Receives the installer's user-facing notifications.
///
/// Callbacks run on the thread driving the update run, never while the
/// installer holds its state lock, so an observer may query or poke the
/// installer from inside a callback.
pub trait StatusObserver: Send + Sync {
    fn on_status_changed(&self, status: LaunchStatus, label: &str, color: Option<ColorHint>);

    fn on_package_installed(&self, _title: &str) {}

    fn on_notice(&self, _text: &str, _color: ColorHint) {}

    fn on_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StatusObserver for NullObserver {
    fn on_status_changed(&self, _status: LaunchStatus, _label: &str, _color: Option<ColorHint>) {}

    fn on_error(&self, _message: &str) {}
}
