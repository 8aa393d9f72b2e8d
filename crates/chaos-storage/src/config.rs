//! Storage configuration

use crate::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "ufileos.com";

/// Which backend a [`Storage`] talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageServer {
    /// UCloud UFile, reached through its S3-compatible API
    Ufile,
    /// Process-local store, contents are lost on exit
    Memory,
}

/// Credentials and addressing for one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudStorage {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub region: String,
    pub bucket: String,
    /// Blank means [`DEFAULT_ENDPOINT`]
    pub endpoint: String,
    pub protocol: String,
    /// Suffix appended to every object URL, e.g. an image style
    pub style_name: Option<String>,
    pub worker_threads: usize,
    /// Seconds
    pub connect_timeout: u64,
    /// Seconds
    pub request_timeout: u64,
}

impl Default for CloudStorage {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            access_key_secret: String::new(),
            region: String::new(),
            bucket: String::new(),
            endpoint: String::new(),
            protocol: "https".to_string(),
            style_name: None,
            worker_threads: 5,
            connect_timeout: 10,
            request_timeout: 30,
        }
    }
}

impl CloudStorage {
    /// Configured endpoint, falling back to [`DEFAULT_ENDPOINT`]
    pub fn endpoint(&self) -> &str {
        match self.endpoint.trim() {
            "" => DEFAULT_ENDPOINT,
            endpoint => endpoint,
        }
    }

    /// `{protocol}://{bucket}.{region}.{endpoint}`
    pub fn bucket_url(&self) -> String {
        format!(
            "{}://{}.{}.{}",
            self.protocol,
            self.bucket,
            self.region,
            self.endpoint()
        )
    }

    /// Public URL of `key`, with the style suffix when one is set
    pub fn object_url(&self, key: &str) -> String {
        let mut url = format!("{}/{}", self.bucket_url(), key);
        if let Some(style) = self.style_name.as_deref().filter(|s| !s.trim().is_empty()) {
            url.push_str(style);
        }
        url
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// A backend together with its settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub server: StorageServer,
    #[serde(default)]
    pub config: CloudStorage,
}

impl Storage {
    pub fn new(server: StorageServer, config: CloudStorage) -> Self {
        Self { server, config }
    }

    /// Read the `[storage]` table of a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct File {
            storage: Storage,
        }

        let contents = fs::read_to_string(path)?;
        let file: File = toml::from_str(&contents)
            .map_err(|e| StorageError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(file.storage)
    }
}
