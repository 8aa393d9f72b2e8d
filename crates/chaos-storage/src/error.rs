use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object store error, {context}: {source}")]
    ObjectStore {
        context: &'static str,
        #[source]
        source: object_store::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] chaos_core::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl StorageError {
    pub(crate) fn store(context: &'static str) -> impl FnOnce(object_store::Error) -> Self {
        move |source| StorageError::ObjectStore { context, source }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for std::io::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(io_err) => io_err,
            StorageError::Core(core_err) => core_err.into(),
            StorageError::InvalidArgument(_) => std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}
