//! Testing utilities and fixtures for chaos
//!
//! Stream doubles that misbehave in controlled ways, sample data, a mock
//! HTTP server and a temporary directory helper.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod doubles;
pub mod fixtures;
pub mod server;

pub use doubles::{ChunkedReader, FailingWriter, FlakyWriter, InterruptingReader, RecordingCloseable, ShortWriter};
pub use server::{MockServer, RecordedRequest};

/// Creates a temporary test directory with cleanup on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a new temporary test directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a file with the given name and content in the test directory
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Path for a file that does not exist yet
    pub fn child(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_dir() {
        let test_dir = TestDir::new().unwrap();
        assert!(test_dir.path().exists());
    }

    #[test]
    fn test_create_nested_file() {
        let test_dir = TestDir::new().unwrap();
        let file_path = test_dir.create_file("a/b/test.txt", b"Hello, World!").unwrap();
        assert_eq!(std::fs::read(&file_path).unwrap(), b"Hello, World!");
        assert!(!test_dir.child("missing.txt").exists());
    }
}
