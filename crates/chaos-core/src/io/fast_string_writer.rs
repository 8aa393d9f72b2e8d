//! Unsynchronized in-memory text sink
//!
//! `FastStringWriter` keeps its characters in a plain array that doubles when
//! full. It is meant for a single owner on a single thread. Writing `None`
//! text is a silent no-op instead of an error.

use super::chars::CharWrite;
use crate::{Error, Result};
use std::fmt;
use std::io;

/// Initial capacity used by [`FastStringWriter::new`]
pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// A growable character buffer
#[derive(Debug, Clone)]
pub struct FastStringWriter {
    /// Backing array; its length is the capacity
    buf: Vec<char>,
    /// Number of characters written
    count: usize,
}

impl Default for FastStringWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FastStringWriter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec!['\0'; capacity],
            count: 0,
        }
    }

    /// Create a writer from a signed size, as handed over by configuration
    /// or foreign callers
    ///
    /// # Errors
    /// `InvalidArgument` if `initial_size` is negative
    pub fn with_initial_size(initial_size: i64) -> Result<Self> {
        if initial_size < 0 {
            return Err(Error::InvalidArgument(format!(
                "Negative initial size: {}",
                initial_size
            )));
        }
        let capacity = usize::try_from(initial_size)
            .map_err(|_| Error::InvalidArgument(format!("Initial size too large: {}", initial_size)))?;
        Ok(Self::with_capacity(capacity))
    }

    /// Number of characters written so far
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current capacity of the backing array
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn write_char(&mut self, c: char) {
        let new_count = self.count + 1;
        self.ensure_capacity(new_count);
        self.buf[self.count] = c;
        self.count = new_count;
    }

    /// Append `length` characters of `chars` starting at `offset`
    ///
    /// # Errors
    /// `IndexOutOfBounds` if the range does not lie within `chars`
    pub fn write_chars(&mut self, chars: &[char], offset: usize, length: usize) -> Result<()> {
        if offset > chars.len() || length > chars.len() - offset {
            return Err(Error::IndexOutOfBounds {
                offset,
                length,
                size: chars.len(),
            });
        }
        if length == 0 {
            return Ok(());
        }
        self.push_slice(&chars[offset..offset + length]);
        Ok(())
    }

    /// Append `text`; `None` leaves the buffer untouched
    pub fn write_opt(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            self.push_str(text);
        }
    }

    /// Append the characters of `text` in `start..end` (character indices);
    /// `None` leaves the buffer untouched
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `start > end` or `end` exceeds the text length
    pub fn write_str_range(&mut self, text: Option<&str>, start: usize, end: usize) -> Result<()> {
        let Some(text) = text else {
            return Ok(());
        };
        let size = text.chars().count();
        if start > end || end > size {
            return Err(Error::IndexOutOfBounds {
                offset: start,
                length: end.saturating_sub(start),
                size,
            });
        }
        let len = end - start;
        self.ensure_capacity(self.count + len);
        for (slot, c) in self.buf[self.count..].iter_mut().zip(text.chars().skip(start).take(len)) {
            *slot = c;
        }
        self.count += len;
        Ok(())
    }

    /// Chainable form of [`write_opt`](Self::write_opt)
    pub fn append(&mut self, text: Option<&str>) -> &mut Self {
        self.write_opt(text);
        self
    }

    /// Chainable form of [`write_str_range`](Self::write_str_range)
    pub fn append_range(&mut self, text: Option<&str>, start: usize, end: usize) -> Result<&mut Self> {
        self.write_str_range(text, start, end)?;
        Ok(self)
    }

    pub fn append_char(&mut self, c: char) -> &mut Self {
        self.write_char(c);
        self
    }

    /// Copy of the written text. Does not change the buffer.
    pub fn snapshot(&self) -> String {
        self.buf[..self.count].iter().collect()
    }

    /// No-op, nothing is buffered outside memory
    pub fn flush(&mut self) {}

    /// No-op, there is no external resource
    pub fn close(&mut self) {}

    fn push_str(&mut self, text: &str) {
        self.ensure_capacity(self.count + text.chars().count());
        for c in text.chars() {
            self.buf[self.count] = c;
            self.count += 1;
        }
    }

    fn push_slice(&mut self, chars: &[char]) {
        let new_count = self.count + chars.len();
        self.ensure_capacity(new_count);
        self.buf[self.count..new_count].copy_from_slice(chars);
        self.count = new_count;
    }

    fn ensure_capacity(&mut self, minimum: usize) {
        if minimum > self.buf.len() {
            self.expand_capacity(minimum);
        }
    }

    fn expand_capacity(&mut self, minimum: usize) {
        let new_capacity = self.buf.len().saturating_mul(2).max(minimum);
        self.buf.resize(new_capacity, '\0');
    }
}

impl fmt::Display for FastStringWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.buf[..self.count] {
            fmt::Write::write_char(f, *c)?;
        }
        Ok(())
    }
}

impl fmt::Write for FastStringWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        FastStringWriter::write_char(self, c);
        Ok(())
    }
}

impl CharWrite for FastStringWriter {
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()> {
        self.push_slice(buf);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}
