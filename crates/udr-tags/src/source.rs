//! Snapshot sources
//!
//! A [`SnapshotSource`] produces the current [`ServiceTagSnapshot`] for a
//! cloud. The HTTP source follows the published download page; the file
//! source reads a document that was downloaded earlier.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};
use udr_core::{CloudEnvironment, ServiceTagSnapshot};

use crate::document::parse_document;
use crate::scrape::find_document_link;
use crate::{Error, Result};

/// Default timeout for each HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("udr-sync/", env!("CARGO_PKG_VERSION"));

/// Trait for anything that can hand out a service tag snapshot.
pub trait SnapshotSource {
    /// Fetch and parse the current snapshot for `cloud`.
    fn fetch(&self, cloud: CloudEnvironment) -> Result<ServiceTagSnapshot>;
}

/// Downloads the document through the cloud's confirmation page.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    /// Skip scraping and download this URL directly
    document_url: Option<String>,
    /// Scrape this page instead of the cloud's published one
    page_url: Option<String>,
}

impl HttpSnapshotSource {
    /// Creates a source with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::http("<client>", e))?;
        Ok(Self {
            client,
            document_url: None,
            page_url: None,
        })
    }

    pub fn with_document_url(mut self, url: Option<String>) -> Self {
        self.document_url = url;
        self
    }

    pub fn with_page_url(mut self, url: Option<String>) -> Self {
        self.page_url = url;
        self
    }

    /// Works out which URL the document will be downloaded from.
    pub fn resolve_document_url(&self, cloud: CloudEnvironment) -> Result<String> {
        if let Some(url) = &self.document_url {
            return Ok(url.clone());
        }

        let page_url = self
            .page_url
            .as_deref()
            .unwrap_or_else(|| cloud.download_page());
        debug!(%cloud, url = %page_url, "Fetching download page");

        let page = self.get_text(page_url)?;
        let link = find_document_link(&page).ok_or_else(|| Error::DocumentLinkNotFound {
            url: page_url.to_string(),
        })?;
        debug!(%cloud, url = %link, "Found service tag document link");
        Ok(link.to_string())
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send().map_err(|e| Error::http(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn get_text(&self, url: &str) -> Result<String> {
        self.get(url)?.text().map_err(|e| Error::http(url, e))
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self, cloud: CloudEnvironment) -> Result<ServiceTagSnapshot> {
        let url = self.resolve_document_url(cloud)?;
        let body = self.get(&url)?.bytes().map_err(|e| Error::http(&url, e))?;
        let snapshot = parse_document(&body, &url)?;
        info!(
            %cloud,
            change_number = snapshot.change_number,
            tags = snapshot.len(),
            "Downloaded service tag snapshot"
        );
        Ok(snapshot)
    }
}

/// Reads a previously downloaded document from disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn fetch(&self, cloud: CloudEnvironment) -> Result<ServiceTagSnapshot> {
        let bytes = fs::read(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = parse_document(&bytes, &self.path.display().to_string())?;
        debug!(
            %cloud,
            path = %self.path.display(),
            document_cloud = %snapshot.cloud,
            "Loaded service tag snapshot from file"
        );
        Ok(snapshot)
    }
}
