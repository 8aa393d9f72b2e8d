//! Character encoding lookup
//!
//! Every conversion between bytes and characters takes an explicit charset.
//! Callers that pass `None` get [`default_charset`]; the host platform's
//! locale is never consulted.

use crate::{Error, Result};
use encoding_rs::Encoding;

pub use encoding_rs::{Encoding as Charset, UTF_8, WINDOWS_1252, UTF_16BE, UTF_16LE};

/// Charset used when none is given
pub fn default_charset() -> &'static Charset {
    UTF_8
}

/// Look up a charset by its label (`"UTF-8"`, `"gbk"`, `"iso-8859-1"`, ...)
pub fn charset_for_name(name: &str) -> Result<&'static Charset> {
    Encoding::for_label(name.trim().as_bytes())
        .ok_or_else(|| Error::UnsupportedEncoding(name.to_string()))
}

/// Resolve an optional charset to a concrete one
pub fn resolve_charset(charset: Option<&'static Charset>) -> &'static Charset {
    charset.unwrap_or_else(default_charset)
}

/// Resolve an optional charset label to a concrete charset
pub fn resolve_charset_name(name: Option<&str>) -> Result<&'static Charset> {
    match name {
        Some(name) => charset_for_name(name),
        None => Ok(default_charset()),
    }
}
