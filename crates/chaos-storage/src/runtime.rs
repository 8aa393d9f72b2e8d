//! Tokio runtime for driving object store calls from blocking code

use crate::{Result, StorageError};
use tokio::runtime::Runtime;

/// Build a runtime owned by a single client
pub(crate) fn build_runtime(worker_threads: usize) -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .enable_all()
        .thread_name("chaos-storage-worker")
        .build()
        .map_err(|e| StorageError::Runtime(format!("Failed to create Tokio runtime: {}", e)))
}
