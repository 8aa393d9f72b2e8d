//! # chaos-storage
//!
//! Object storage for chaos. [`UfileStorageClient`] uploads streams to and
//! deletes objects from a UCloud UFile bucket through its S3-compatible API,
//! exposing a blocking interface over `object_store`.
//!
//! ## Architecture
//!
//! - [`StorageClient`]: the blocking upload/delete contract
//! - [`UfileStorageClient`]: implementation over any `ObjectStore`, driven by
//!   a Tokio runtime the client owns
//! - [`Storage`]: which backend to use plus its [`CloudStorage`] settings,
//!   loadable from the `[storage]` table of a TOML file

#![warn(missing_debug_implementations)]

mod client;
mod config;
mod error;
mod file_info;
mod runtime;

pub use client::{storage_client, StorageClient, UfileStorageClient};
pub use config::{CloudStorage, Storage, StorageServer, DEFAULT_ENDPOINT};
pub use error::{Result, StorageError};
pub use file_info::{FileInfo, FileStatus};

// Re-export commonly used types from object_store
pub use object_store::{path::Path as ObjectPath, ObjectStore};
