use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use creo_installer::{
    default_local_app_dir, InstallLayout, APPLICATION_PATH, BUILD_DIR, CONTENT_DIR,
    DEFAULT_BASE_URL, DEFAULT_FETCH_ATTEMPTS, DEFAULT_TIMEOUT, DOWNLOADS_DIR, LOCAL_APP_FOLDER,
    REMOTE_VERSION_LABEL_FILE, VERSIONING_FILE,
};

pub const CONFIG_FILE_NAME: &str = "launcher.toml";
pub const BASE_URL_ENV: &str = "CREO_BASE_URL";
pub const FETCH_ATTEMPTS_ENV: &str = "CREO_FETCH_ATTEMPTS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    pub base_url: String,
    pub versioning_file: String,
    pub version_file: String,
    pub downloads_dir: String,
    pub build_dir: String,
    pub content_dir: String,
    pub local_app_folder: String,
    pub application_path: String,
    pub fetch_attempts: u32,
    pub timeout_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            versioning_file: VERSIONING_FILE.to_string(),
            version_file: REMOTE_VERSION_LABEL_FILE.to_string(),
            downloads_dir: DOWNLOADS_DIR.to_string(),
            build_dir: BUILD_DIR.to_string(),
            content_dir: CONTENT_DIR.to_string(),
            local_app_folder: LOCAL_APP_FOLDER.to_string(),
            application_path: APPLICATION_PATH.to_string(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl LauncherConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("failed to parse launcher config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `explicit`, or `launcher.toml` under `root` when present.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => root.join(CONFIG_FILE_NAME),
        };

        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml_str(&raw)
                .with_context(|| format!("invalid launcher config: {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
                Ok(Self::default())
            }
            Err(err) => Err(err)
                .with_context(|| format!("failed to read launcher config: {}", path.display())),
        }
    }

    pub fn apply_env_overrides<L>(mut self, lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(attempts) =
            parse_fetch_attempts(lookup(FETCH_ATTEMPTS_ENV).as_deref(), FETCH_ATTEMPTS_ENV)?
        {
            self.fetch_attempts = attempts;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn layout(&self, root: &Path) -> InstallLayout {
        let layout = InstallLayout::new(root)
            .with_downloads_dir(&self.downloads_dir)
            .with_build_dir(&self.build_dir)
            .with_content_dir(&self.content_dir)
            .with_versioning_file(&self.versioning_file)
            .with_application_path(&self.application_path);
        match default_local_app_dir(&self.local_app_folder) {
            Some(dir) => layout.with_local_app_dir(dir),
            None => layout,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_attempts == 0 {
            return Err(anyhow!("fetch_attempts must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be at least 1"));
        }
        if self.versioning_file.trim().is_empty() {
            return Err(anyhow!("versioning_file must not be empty"));
        }
        Ok(())
    }
}

pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("failed to resolve current directory"),
    }
}

fn parse_fetch_attempts(value: Option<&str>, var_name: &str) -> Result<Option<u32>> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    match value.parse::<u32>() {
        Ok(attempts) if attempts > 0 => Ok(Some(attempts)),
        _ => Err(anyhow!(
            "invalid {var_name} value '{value}' (expected a positive integer)"
        )),
    }
}
