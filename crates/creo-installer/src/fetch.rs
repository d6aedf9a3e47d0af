use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::fs_utils::remove_file_if_exists;

pub const DEFAULT_BASE_URL: &str = "http://creo-nexus.us-east-1.linodeobjects.com/";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves resources published relative to the update server's base URL.
pub trait PackageFetcher {
    fn fetch_text(&self, remote_path: &str) -> Result<String>;

    fn fetch_to_file(&self, remote_path: &str, destination: &Path) -> Result<()>;

    /// Human-readable location of `remote_path`, used in error reports.
    fn describe(&self, remote_path: &str) -> String {
        remote_path.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    attempts: u32,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration, attempts: u32) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("creo-launcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.to_string(),
            attempts: attempts.max(1),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, remote_path: &str) -> String {
        join_url(&self.base_url, remote_path)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            debug!(url, attempt, "requesting");
            match self
                .client
                .get(url)
                .send()
                .and_then(|response| response.error_for_status())
            {
                Ok(response) => return Ok(response),
                Err(err) => {
                    warn!(url, attempt, error = %err, "request failed");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) => Err(anyhow::Error::new(err).context(format!(
                "GET {url} failed after {} attempt(s)",
                self.attempts
            ))),
            None => Err(anyhow!("GET {url} was never attempted")),
        }
    }
}

impl PackageFetcher for HttpFetcher {
    fn fetch_text(&self, remote_path: &str) -> Result<String> {
        let url = self.url_for(remote_path);
        self.get(&url)?
            .text()
            .with_context(|| format!("failed to read response body from {url}"))
    }

    /// Streams into `<destination>.part` and renames on success, so an
    /// interrupted download never masquerades as a complete one.
    fn fetch_to_file(&self, remote_path: &str, destination: &Path) -> Result<()> {
        let url = self.url_for(remote_path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create download dir: {}", parent.display()))?;
        }

        let part_path = destination.with_file_name(format!(
            "{}.part",
            destination
                .file_name()
                .and_then(|v| v.to_str())
                .unwrap_or("download")
        ));

        let result = (|| -> Result<()> {
            let mut response = self.get(&url)?;
            let mut file = fs::File::create(&part_path)
                .with_context(|| format!("failed to create {}", part_path.display()))?;
            response
                .copy_to(&mut file)
                .with_context(|| format!("failed to download {url}"))?;
            Ok(())
        })();

        if let Err(err) = result {
            let _ = remove_file_if_exists(&part_path);
            return Err(err);
        }

        fs::rename(&part_path, destination).with_context(|| {
            format!(
                "failed to move downloaded file into place: {}",
                destination.display()
            )
        })?;
        Ok(())
    }

    fn describe(&self, remote_path: &str) -> String {
        self.url_for(remote_path)
    }
}

pub fn join_url(base_url: &str, remote_path: &str) -> String {
    if base_url.is_empty() {
        return remote_path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        remote_path.trim_start_matches('/')
    )
}
