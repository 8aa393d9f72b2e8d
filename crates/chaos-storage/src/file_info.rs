use serde::{Deserialize, Serialize};

/// Lifecycle of an uploaded object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Pending,
    UploadSuccess,
    UploadFailed,
}

/// An object on its way into storage, completed by the upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Object key within the bucket
    pub key: String,
    pub name: Option<String>,
    pub content_type: Option<String>,
    /// Bytes stored; set by the upload
    pub size: Option<u64>,
    pub url: Option<String>,
    pub e_tag: Option<String>,
    /// Milliseconds since the Unix epoch
    pub upload_time: Option<i64>,
    pub status: FileStatus,
}

impl FileInfo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_uploaded(&self) -> bool {
        self.status == FileStatus::UploadSuccess
    }
}
