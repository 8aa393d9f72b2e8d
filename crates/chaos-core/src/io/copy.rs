//! Buffered copying between sources and sinks
//!
//! Every copy pulls chunks into a working buffer and pushes the filled part
//! to the sink until the source is exhausted or the requested length has been
//! moved. Sources and sinks stay owned by the caller and are never closed.

use super::charset::{resolve_charset, Charset};
use super::chars::{CharRead, CharReader, CharWrite, CharWriter};
use super::read::{non_negative, skip_chars_fully, skip_fully_with_buffer};
use super::{DEFAULT_BUFFER_SIZE, SKIP_BUFFER_SIZE};
use crate::{Error, Result};
use std::io::{ErrorKind, Read, Write};
use tracing::trace;

/// Parameters of a bounded copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyParameters {
    /// Units to skip before copying; must not be negative
    pub offset: i64,
    /// Units to copy; negative copies to exhaustion, zero copies nothing
    pub length: i64,
    /// Size of the working buffer; must not be zero
    pub buffer_size: usize,
    /// Scratch buffer for skipping the offset of a byte copy; must not be zero
    pub skip_buffer_size: usize,
}

impl Default for CopyParameters {
    fn default() -> Self {
        Self {
            offset: 0,
            length: -1,
            buffer_size: DEFAULT_BUFFER_SIZE,
            skip_buffer_size: SKIP_BUFFER_SIZE,
        }
    }
}

impl CopyParameters {
    pub fn new(offset: i64, length: i64) -> Self {
        Self {
            offset,
            length,
            ..Self::default()
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_skip_buffer_size(mut self, skip_buffer_size: usize) -> Self {
        self.skip_buffer_size = skip_buffer_size;
        self
    }

    /// Check the parameters without touching any stream
    ///
    /// # Errors
    /// `InvalidArgument` for a negative offset or a zero buffer size
    pub fn validate(&self) -> Result<()> {
        non_negative("Input offset", self.offset)?;
        check_buffer_size(self.buffer_size)?;
        if self.skip_buffer_size == 0 {
            return Err(Error::InvalidArgument("Skip buffer size must be positive".to_string()));
        }
        Ok(())
    }

    /// The length limit, `None` meaning "until the source is exhausted"
    fn limit(&self) -> Option<u64> {
        u64::try_from(self.length).ok()
    }
}

fn check_buffer_size(buffer_size: usize) -> Result<()> {
    if buffer_size == 0 {
        return Err(Error::InvalidArgument("Buffer size must be positive".to_string()));
    }
    Ok(())
}

/// Narrow a copied count to the bounded return type. `None` means more than
/// `i32::MAX` units were copied; the copy itself still completed.
fn bounded(count: u64) -> Option<u32> {
    if count > i32::MAX as u64 {
        None
    } else {
        Some(count as u32)
    }
}

/// Copy all bytes from `input` to `output`
///
/// Returns `None` instead of a count when more than `i32::MAX` bytes were
/// copied. Use [`copy_large`] for an exact 64-bit count.
pub fn copy<R, W>(input: &mut R, output: &mut W) -> Result<Option<u32>>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    copy_large(input, output).map(bounded)
}

/// Copy all bytes using a working buffer of `buffer_size` bytes
pub fn copy_with_buffer_size<R, W>(input: &mut R, output: &mut W, buffer_size: usize) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    check_buffer_size(buffer_size)?;
    copy_large_with_buffer(input, output, &mut vec![0; buffer_size])
}

/// Copy all bytes, returning the exact count
pub fn copy_large<R, W>(input: &mut R, output: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    copy_large_with_buffer(input, output, &mut [0u8; DEFAULT_BUFFER_SIZE])
}

/// Copy all bytes through a caller-supplied working buffer
pub fn copy_large_with_buffer<R, W>(input: &mut R, output: &mut W, buffer: &mut [u8]) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    check_buffer_size(buffer.len())?;
    let mut count = 0u64;
    loop {
        let n = match input.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buffer[..n])?;
        count += n as u64;
    }
    trace!(bytes = count, "Copied byte stream");
    Ok(count)
}

/// Skip `params.offset` bytes, then copy up to `params.length` bytes.
///
/// Stops without error if the source ends before `length` bytes were
/// copied. The offset must be available in full.
///
/// # Errors
/// `InvalidArgument` for bad parameters (before any I/O), `EndOfData` if the
/// source is shorter than `offset`
pub fn copy_range<R, W>(input: &mut R, output: &mut W, params: CopyParameters) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    params.validate()?;
    if params.offset > 0 {
        let mut scratch = vec![0u8; params.skip_buffer_size.min(usize::try_from(params.offset).unwrap_or(usize::MAX))];
        skip_fully_with_buffer(input, params.offset, &mut scratch)?;
    }
    let Some(limit) = params.limit() else {
        return copy_large_with_buffer(input, output, &mut vec![0; params.buffer_size]);
    };
    if limit == 0 {
        return Ok(0);
    }

    let mut buffer = vec![0u8; params.buffer_size];
    let mut count = 0u64;
    while count < limit {
        let want = (limit - count).min(buffer.len() as u64) as usize;
        let n = match input.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buffer[..n])?;
        count += n as u64;
    }
    trace!(offset = params.offset, bytes = count, "Copied byte range");
    Ok(count)
}

/// Copy all characters; `None` when more than `i32::MAX` were copied
pub fn copy_chars<R, W>(input: &mut R, output: &mut W) -> Result<Option<u32>>
where
    R: CharRead + ?Sized,
    W: CharWrite + ?Sized,
{
    copy_chars_large(input, output).map(bounded)
}

/// Copy all characters, returning the exact count
pub fn copy_chars_large<R, W>(input: &mut R, output: &mut W) -> Result<u64>
where
    R: CharRead + ?Sized,
    W: CharWrite + ?Sized,
{
    copy_chars_large_with_buffer(input, output, &mut ['\0'; DEFAULT_BUFFER_SIZE])
}

/// Copy all characters through a caller-supplied working buffer
pub fn copy_chars_large_with_buffer<R, W>(
    input: &mut R,
    output: &mut W,
    buffer: &mut [char],
) -> Result<u64>
where
    R: CharRead + ?Sized,
    W: CharWrite + ?Sized,
{
    check_buffer_size(buffer.len())?;
    let mut count = 0u64;
    loop {
        let n = match input.read_chars(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_chars(&buffer[..n])?;
        count += n as u64;
    }
    trace!(chars = count, "Copied character stream");
    Ok(count)
}

/// Character counterpart of [`copy_range`]
pub fn copy_chars_range<R, W>(input: &mut R, output: &mut W, params: CopyParameters) -> Result<u64>
where
    R: CharRead + ?Sized,
    W: CharWrite + ?Sized,
{
    params.validate()?;
    if params.offset > 0 {
        skip_chars_fully(input, params.offset)?;
    }
    let Some(limit) = params.limit() else {
        return copy_chars_large_with_buffer(input, output, &mut vec!['\0'; params.buffer_size]);
    };
    if limit == 0 {
        return Ok(0);
    }

    let mut buffer = vec!['\0'; params.buffer_size];
    let mut count = 0u64;
    while count < limit {
        let want = (limit - count).min(buffer.len() as u64) as usize;
        let n = match input.read_chars(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_chars(&buffer[..n])?;
        count += n as u64;
    }
    Ok(count)
}

/// Decode the bytes of `input` with `charset` and write the characters to
/// `output`. Returns the number of characters written.
///
/// A `None` charset means [`default_charset`](super::charset::default_charset).
pub fn copy_to_chars<R, W>(input: &mut R, output: &mut W, charset: Option<&'static Charset>) -> Result<u64>
where
    R: Read + ?Sized,
    W: CharWrite + ?Sized,
{
    let mut reader = CharReader::new(input, resolve_charset(charset));
    copy_chars_large(&mut reader, output)
}

/// Encode the characters of `input` with `charset` into `output`. The
/// encoder and `output` are flushed before returning. Returns the number of
/// characters read.
pub fn copy_from_chars<R, W>(input: &mut R, output: &mut W, charset: Option<&'static Charset>) -> Result<u64>
where
    R: CharRead + ?Sized,
    W: Write + ?Sized,
{
    let mut writer = CharWriter::new(output, resolve_charset(charset));
    let count = copy_chars_large(input, &mut writer)?;
    writer.finish()?;
    Ok(count)
}
