//! Settings resolution
//!
//! Combines flags (and their `UDR_*` variables, which clap folds into the same
//! fields) with the config file and built-in defaults, and builds the snapshot
//! source and route table backend a command talks to.

use std::path::Path;
use std::time::Duration;

use udr_core::{AddressFamily, CloudEnvironment, DEFAULT_CAPACITY, DEFAULT_PREFIX, RouteTableBackend};
use udr_tables::{ArmBackend, FileBackend};
use udr_tags::{DEFAULT_TIMEOUT, FileSnapshotSource, HttpSnapshotSource, SnapshotSource};

use crate::cli::{BackendArgs, SourceArgs};
use crate::config::{BackendKind, Config};
use crate::error::{CliError, Result};

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone)]
pub struct Context {
    config: Config,
    source: SourceArgs,
    backend: BackendArgs,
}

impl Context {
    pub fn new(config: Config, source: SourceArgs, backend: BackendArgs) -> Self {
        Self {
            config,
            source,
            backend,
        }
    }

    /// Loads the config file per the usual lookup order.
    pub fn load(
        config_path: Option<&Path>,
        cwd: &Path,
        source: SourceArgs,
        backend: BackendArgs,
    ) -> Result<Self> {
        let config = Config::discover(config_path, cwd, crate::config::global_config_dir())?;
        Ok(Self::new(config, source, backend))
    }

    pub fn cloud(&self, flag: Option<&str>) -> Result<CloudEnvironment> {
        match flag.or(self.config.defaults.cloud.as_deref()) {
            Some(name) => Ok(name.parse()?),
            None => Ok(CloudEnvironment::default()),
        }
    }

    pub fn prefix(&self, flag: Option<&str>) -> String {
        flag.or(self.config.defaults.prefix.as_deref())
            .unwrap_or(DEFAULT_PREFIX)
            .to_string()
    }

    pub fn capacity(&self, flag: Option<usize>) -> usize {
        flag.or(self.config.defaults.capacity)
            .unwrap_or(DEFAULT_CAPACITY)
    }

    pub fn family(&self, flag: Option<&str>) -> Result<AddressFamily> {
        match flag.or(self.config.defaults.family.as_deref()) {
            Some(name) => Ok(name.parse()?),
            None => Ok(AddressFamily::default()),
        }
    }

    /// A file source when `--snapshot-file` is set, otherwise HTTP.
    pub fn snapshot_source(&self) -> Result<Box<dyn SnapshotSource>> {
        if let Some(path) = &self.source.snapshot_file {
            return Ok(Box::new(FileSnapshotSource::new(path)));
        }

        let timeout = self
            .config
            .source
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Ok(Box::new(
            HttpSnapshotSource::new(timeout)?
                .with_document_url(self.document_url())
                .with_page_url(self.download_page()),
        ))
    }

    fn document_url(&self) -> Option<String> {
        self.source
            .document_url
            .clone()
            .or_else(|| self.config.source.document_url.clone())
    }

    fn download_page(&self) -> Option<String> {
        self.source
            .download_page
            .clone()
            .or_else(|| self.config.source.download_page.clone())
    }

    /// Backend kind; a table directory alone implies the file backend.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend
            .kind
            .or(self.config.backend.kind)
            .unwrap_or_else(|| {
                if self.table_dir_set() {
                    BackendKind::File
                } else {
                    BackendKind::Arm
                }
            })
    }

    fn table_dir_set(&self) -> bool {
        self.backend.table_dir.is_some() || self.config.backend.table_dir.is_some()
    }

    pub fn backend(&self, cloud: CloudEnvironment) -> Result<Box<dyn RouteTableBackend>> {
        match self.backend_kind() {
            BackendKind::File => {
                let dir = self
                    .backend
                    .table_dir
                    .as_ref()
                    .or(self.config.backend.table_dir.as_ref())
                    .ok_or_else(|| {
                        CliError::user(
                            "The file backend needs a table directory: pass --table-dir or set [backend] table_dir",
                        )
                    })?;
                tracing::debug!(dir = %dir.display(), "Using file backend");
                Ok(Box::new(FileBackend::new(dir)))
            }
            BackendKind::Arm => {
                let subscription = self
                    .backend
                    .subscription
                    .clone()
                    .or_else(|| self.config.backend.subscription.clone())
                    .unwrap_or_default();
                let token = self.backend.access_token.clone().unwrap_or_default();
                let mut backend = ArmBackend::new(cloud, subscription, token)?;
                if let Some(endpoint) = self
                    .backend
                    .endpoint
                    .as_ref()
                    .or(self.config.backend.endpoint.as_ref())
                {
                    backend = backend.with_endpoint(endpoint);
                }
                tracing::debug!(%cloud, "Using Resource Manager backend");
                Ok(Box::new(backend))
            }
        }
    }
}
