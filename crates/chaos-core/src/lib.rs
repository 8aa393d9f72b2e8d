//! Chaos - stream utilities and a blocking HTTP helper
//!
//! This library provides buffered copying between byte and character
//! streams, exact-count reads and skips, content comparison, line decoding,
//! a growable in-memory text sink and best-effort resource release.

pub mod config;
pub mod error;
pub mod http;
pub mod io;

pub use error::{Error, Result};

// Re-export commonly used types
pub use config::Config;
pub use http::{HttpRequestClient, HttpResult};
pub use io::{
    close_quietly, content_equals, copy, copy_large, copy_range, read_fully, read_lines, skip_fully,
    Charset, Closeable, CopyParameters, FastStringWriter, LineReader,
};
