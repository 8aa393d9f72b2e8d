//! Stream utilities
//!
//! Free functions over explicit sources, sinks and buffers. Nothing here
//! keeps hidden state between calls: working and scratch buffers are either
//! local to a call or supplied by the caller.
//!
//! - [`copy`]: buffered transfer between byte and character streams
//! - [`read`]: exact-count reads and skips
//! - [`compare`]: content equality of two sources
//! - [`lines`]: line-oriented decoding
//! - [`close`]: best-effort resource release
//! - [`FastStringWriter`]: growable in-memory text sink

pub mod charset;
pub mod chars;
pub mod close;
pub mod compare;
pub mod convert;
pub mod copy;
pub mod fast_string_writer;
pub mod lines;
pub mod read;

/// Default working buffer size for copies, in units
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Scratch buffer size used by skips, in units
pub const SKIP_BUFFER_SIZE: usize = 2048;

pub const LINE_SEPARATOR_UNIX: &str = "\n";
pub const LINE_SEPARATOR_WINDOWS: &str = "\r\n";

/// Line separator written when the caller does not choose one
pub const LINE_SEPARATOR: &str = LINE_SEPARATOR_UNIX;

pub use charset::{charset_for_name, default_charset, resolve_charset, resolve_charset_name, Charset};
pub use chars::{CharRead, CharReader, CharWrite, CharWriter, StrReader};
pub use close::{close_all_quietly, close_quietly, Closeable};
pub use compare::{content_equals, content_equals_chars, content_equals_ignore_eol};
pub use convert::{
    chars_to_byte_array, chars_to_string, is_empty, read_to_string, to_byte_array, to_byte_array_sized,
    to_char_array, to_input_stream, write_bytes, write_bytes_to_chars, write_chars_to, write_chunked, write_lines,
    write_text,
};
pub use copy::{
    copy, copy_chars, copy_chars_large, copy_chars_large_with_buffer, copy_chars_range, copy_from_chars,
    copy_large, copy_large_with_buffer, copy_range, copy_to_chars, copy_with_buffer_size, CopyParameters,
};
pub use fast_string_writer::FastStringWriter;
pub use lines::{lines, read_lines, read_lines_from_chars, LineReader};
pub use read::{
    read, read_chars, read_chars_fully, read_fully, read_fully_range, read_fully_to_vec, read_range, skip,
    skip_chars, skip_chars_fully, skip_fully, skip_fully_with_buffer, skip_with_buffer,
};
