//! Storage clients

use crate::config::{CloudStorage, Storage, StorageServer};
use crate::file_info::{FileInfo, FileStatus};
use crate::runtime::build_runtime;
use crate::{Result, StorageError};
use chaos_core::io::to_byte_array;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload};
use std::io::Read;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Blocking upload and delete against one bucket
pub trait StorageClient {
    /// Store the whole of `reader` under `info.key` and return `info`
    /// completed with its URL, entity tag, upload time and status
    fn upload(&self, reader: &mut dyn Read, info: FileInfo) -> Result<FileInfo>;

    /// Remove one object
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every object in `keys`, stopping at the first failure
    fn delete_all(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Err(StorageError::InvalidArgument(
                "Keys to delete must not be empty".to_string(),
            ));
        }
        keys.iter().try_for_each(|key| self.delete(key))
    }
}

/// Build the client matching `storage.server`
pub fn storage_client(storage: Storage) -> Result<Box<dyn StorageClient>> {
    match storage.server {
        StorageServer::Ufile => Ok(Box::new(UfileStorageClient::new(storage)?)),
        StorageServer::Memory => Ok(Box::new(UfileStorageClient::with_store(
            Arc::new(InMemory::new()),
            storage.config,
        )?)),
    }
}

/// UFile client speaking the S3-compatible API
///
/// Each client owns its runtime; calls block the current thread and must not
/// be made from inside another Tokio runtime.
#[derive(Debug)]
pub struct UfileStorageClient {
    store: Arc<dyn ObjectStore>,
    config: CloudStorage,
    runtime: Runtime,
}

impl UfileStorageClient {
    /// Connect to UFile
    ///
    /// # Errors
    /// `Config` if `storage` is not a UFile storage or the store cannot be
    /// built from its settings
    pub fn new(storage: Storage) -> Result<Self> {
        if storage.server != StorageServer::Ufile {
            return Err(StorageError::Config(format!(
                "Expected a ufile storage, got {:?}",
                storage.server
            )));
        }
        let config = storage.config;
        debug!(bucket = %config.bucket, region = %config.region, endpoint = config.endpoint(), "Creating UFile client");

        let options = ClientOptions::new()
            .with_connect_timeout(config.connect_timeout())
            .with_timeout(config.request_timeout())
            .with_allow_http(config.protocol.eq_ignore_ascii_case("http"));

        let store = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.access_key_secret)
            .with_endpoint(config.bucket_url())
            .with_virtual_hosted_style_request(true)
            .with_client_options(options)
            .build()
            .map_err(|e| StorageError::Config(format!("Invalid UFile settings: {}", e)))?;

        Self::with_store(Arc::new(store), config)
    }

    /// Use an already built store, e.g. an in-memory one
    pub fn with_store(store: Arc<dyn ObjectStore>, config: CloudStorage) -> Result<Self> {
        let runtime = build_runtime(config.worker_threads)?;
        Ok(Self {
            store,
            config,
            runtime,
        })
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn config(&self) -> &CloudStorage {
        &self.config
    }
}

impl StorageClient for UfileStorageClient {
    fn upload(&self, reader: &mut dyn Read, mut info: FileInfo) -> Result<FileInfo> {
        let path = object_path(&info.key, "upload")?;
        let data = to_byte_array(reader)?;
        let size = data.len() as u64;
        debug!(key = %info.key, size, "Uploading object");

        let mut attributes = Attributes::new();
        if let Some(content_type) = &info.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }
        let mut options = PutOptions::default();
        options.attributes = attributes;

        let result = self
            .runtime
            .block_on(self.store.put_opts(&path, PutPayload::from(data), options))
            .map_err(StorageError::store("upload failed"))?;

        info.url = Some(self.config.object_url(&info.key));
        info.e_tag = result.e_tag;
        info.size = Some(size);
        info.upload_time = Some(chrono::Utc::now().timestamp_millis());
        info.status = FileStatus::UploadSuccess;
        info!(key = %info.key, size, "Uploaded object");
        Ok(info)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = object_path(key, "delete")?;
        debug!(key, "Deleting object");
        self.runtime
            .block_on(self.store.delete(&path))
            .map_err(StorageError::store("delete failed"))
    }
}

fn object_path(key: &str, action: &str) -> Result<ObjectPath> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidArgument(format!(
            "Key to {} must not be blank",
            action
        )));
    }
    ObjectPath::parse(key)
        .map_err(|e| StorageError::InvalidArgument(format!("Invalid key {:?}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_client() -> UfileStorageClient {
        let config = CloudStorage {
            bucket: "b".to_string(),
            region: "r".to_string(),
            worker_threads: 1,
            ..CloudStorage::default()
        };
        UfileStorageClient::with_store(Arc::new(InMemory::new()), config).unwrap()
    }

    #[test]
    fn test_rejects_non_ufile_storage() {
        let storage = Storage::new(StorageServer::Memory, CloudStorage::default());
        assert!(matches!(UfileStorageClient::new(storage), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_builds_ufile_client_offline() {
        let config = CloudStorage {
            access_key_id: "id".to_string(),
            access_key_secret: "secret".to_string(),
            region: "cn-bj".to_string(),
            bucket: "photos".to_string(),
            worker_threads: 1,
            ..CloudStorage::default()
        };
        let client = UfileStorageClient::new(Storage::new(StorageServer::Ufile, config)).unwrap();
        assert_eq!(client.config().endpoint(), "ufileos.com");
    }

    #[test]
    fn test_blank_keys_are_rejected() {
        let client = memory_client();
        let err = client.upload(&mut &b"x"[..], FileInfo::new(" ")).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
        assert!(matches!(client.delete(""), Err(StorageError::InvalidArgument(_))));
        assert!(matches!(client.delete_all(&[]), Err(StorageError::InvalidArgument(_))));
    }

    #[test]
    fn test_object_path_validation() {
        assert!(object_path("a/b.txt", "upload").is_ok());
        assert!(matches!(object_path("a//b", "upload"), Err(StorageError::InvalidArgument(_))));
    }
}
