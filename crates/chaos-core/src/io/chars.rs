//! Character sources and sinks
//!
//! `std::io` only speaks bytes. The copy engine also moves characters, so this
//! module defines the character-side counterparts of `Read` and `Write` and
//! the adapters that bridge the two through an explicit [`Charset`].

use super::charset::Charset;
use encoding_rs::{CoderResult, Decoder, Encoder};
use std::io::{self, ErrorKind, Read, Write};

const BYTE_BUFFER_SIZE: usize = 8 * 1024;

/// A readable origin of characters
pub trait CharRead {
    /// Read up to `buf.len()` characters, returning how many were read.
    /// `Ok(0)` on a non-empty buffer means end of data.
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize>;

    /// Read a single character, `None` at end of data
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut one = ['\0'; 1];
        loop {
            match self.read_chars(&mut one) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(one[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// A writable destination for characters
pub trait CharWrite {
    /// Write every character of `buf`, blocking until all are accepted
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()>;

    /// Write every character of `text`
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        let mut chunk = ['\0'; 256];
        let mut len = 0;
        for c in text.chars() {
            chunk[len] = c;
            len += 1;
            if len == chunk.len() {
                self.write_chars(&chunk)?;
                len = 0;
            }
        }
        if len > 0 {
            self.write_chars(&chunk[..len])?;
        }
        Ok(())
    }

    /// Push buffered characters towards their final destination
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: CharRead + ?Sized> CharRead for &mut C {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(buf)
    }
}

impl<C: CharRead + ?Sized> CharRead for Box<C> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(buf)
    }
}

impl<W: CharWrite + ?Sized> CharWrite for &mut W {
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()> {
        (**self).write_chars(buf)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<W: CharWrite + ?Sized> CharWrite for Box<W> {
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()> {
        (**self).write_chars(buf)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl CharWrite for String {
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()> {
        self.extend(buf.iter());
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

/// Character source over in-memory text
#[derive(Debug, Clone)]
pub struct StrReader {
    text: String,
    /// Byte offset of the next character
    pos: usize,
}

impl StrReader {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }

    /// Text not yet read
    pub fn remaining(&self) -> &str {
        &self.text[self.pos..]
    }
}

impl CharRead for StrReader {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        let mut n = 0;
        for c in self.text[self.pos..].chars().take(buf.len()) {
            buf[n] = c;
            n += 1;
            self.pos += c.len_utf8();
        }
        Ok(n)
    }
}

/// Decodes a byte source into characters
pub struct CharReader<R> {
    inner: R,
    decoder: Decoder,
    bytes: Box<[u8]>,
    decoded: String,
    /// Byte offset into `decoded` of the next character
    decoded_pos: usize,
    eof: bool,
}

impl<R: Read> CharReader<R> {
    /// Wrap `inner`, decoding with `charset`. A leading byte order mark is
    /// honoured and stripped.
    pub fn new(inner: R, charset: &'static Charset) -> Self {
        Self {
            inner,
            decoder: charset.new_decoder(),
            bytes: vec![0; BYTE_BUFFER_SIZE].into_boxed_slice(),
            decoded: String::new(),
            decoded_pos: 0,
            eof: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next block of bytes and decode it into `decoded`
    fn fill(&mut self) -> io::Result<()> {
        let n = loop {
            match self.inner.read(&mut self.bytes) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        let last = n == 0;
        self.eof = last;
        self.decoded.clear();
        self.decoded_pos = 0;

        let mut src = &self.bytes[..n];
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 16);
            self.decoded.reserve(needed);
            let (result, read, _) = self.decoder.decode_to_string(src, &mut self.decoded, last);
            src = &src[read..];
            if let CoderResult::InputEmpty = result {
                break;
            }
        }
        Ok(())
    }
}

impl<R: Read> CharRead for CharReader<R> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.decoded_pos < self.decoded.len() {
                let mut n = 0;
                for c in self.decoded[self.decoded_pos..].chars().take(buf.len()) {
                    buf[n] = c;
                    n += 1;
                    self.decoded_pos += c.len_utf8();
                }
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }
            // A block may end inside a multi-byte sequence and decode to nothing
            self.fill()?;
        }
    }
}

impl<R> std::fmt::Debug for CharReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharReader")
            .field("encoding", &self.decoder.encoding().name())
            .field("eof", &self.eof)
            .finish()
    }
}

/// Encodes characters into a byte sink.
///
/// Charsets without an encoder of their own (UTF-16LE/BE) encode as UTF-8,
/// following the WHATWG encoding standard.
pub struct CharWriter<W> {
    inner: W,
    encoder: Encoder,
    staging: String,
    bytes: Vec<u8>,
    finished: bool,
}

impl<W: Write> CharWriter<W> {
    pub fn new(inner: W, charset: &'static Charset) -> Self {
        Self {
            inner,
            encoder: charset.new_encoder(),
            staging: String::new(),
            bytes: Vec::with_capacity(BYTE_BUFFER_SIZE),
            finished: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Encode `text` and hand the bytes to the inner sink
    fn encode(&mut self, text: &str, last: bool) -> io::Result<()> {
        if self.finished {
            return Err(io::Error::new(
                ErrorKind::Other,
                "character writer already finished",
            ));
        }
        let mut src = text;
        loop {
            let needed = self
                .encoder
                .max_buffer_length_from_utf8_if_no_unmappables(src.len())
                .unwrap_or(src.len() * 4 + 16);
            self.bytes.reserve(needed);
            let (result, read, _) = self.encoder.encode_from_utf8_to_vec(src, &mut self.bytes, last);
            src = &src[read..];
            if let CoderResult::InputEmpty = result {
                break;
            }
        }
        // A failed write drops its bytes; they are not resent with the next one
        let written = self.inner.write_all(&self.bytes);
        self.bytes.clear();
        written?;
        self.finished = last;
        Ok(())
    }

    /// Flush any pending encoder state and the inner sink. The writer accepts
    /// no more characters afterwards.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.finished {
            self.encode("", true)?;
        }
        self.inner.flush()
    }

    /// Finish encoding and return the inner sink
    pub fn into_inner(mut self) -> io::Result<W> {
        self.finish()?;
        Ok(self.inner)
    }
}

impl<W: Write> CharWrite for CharWriter<W> {
    fn write_chars(&mut self, buf: &[char]) -> io::Result<()> {
        let mut staging = std::mem::take(&mut self.staging);
        staging.clear();
        staging.extend(buf.iter());
        let result = self.encode(&staging, false);
        self.staging = staging;
        result
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.encode(text, false)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W> std::fmt::Debug for CharWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharWriter")
            .field("encoding", &self.encoder.encoding().name())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::charset::{UTF_16LE, UTF_8};
    use chaos_testing::FlakyWriter;

    fn drain<C: CharRead>(mut reader: C) -> String {
        let mut out = String::new();
        let mut buf = ['\0'; 3];
        loop {
            let n = reader.read_chars(&mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend(&buf[..n]);
        }
    }

    #[test]
    fn test_str_reader_reads_in_chunks() {
        let mut reader = StrReader::new("héllo");
        let mut buf = ['\0'; 2];
        assert_eq!(reader.read_chars(&mut buf).unwrap(), 2);
        assert_eq!(buf, ['h', 'é']);
        assert_eq!(reader.remaining(), "llo");
        assert_eq!(drain(reader), "llo");
    }

    #[test]
    fn test_char_reader_decodes_multibyte_across_blocks() {
        // One byte at a time splits every multi-byte sequence
        struct OneByte<'a>(&'a [u8]);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let text = "你好, wörld";
        let reader = CharReader::new(OneByte(text.as_bytes()), UTF_8);
        assert_eq!(drain(reader), text);
    }

    #[test]
    fn test_char_reader_utf16() {
        let bytes: Vec<u8> = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let reader = CharReader::new(&bytes[..], UTF_16LE);
        assert_eq!(drain(reader), "hi");
    }

    #[test]
    fn test_char_reader_replaces_truncated_sequence() {
        let bytes = [b'a', 0xE4, 0xBD];
        let reader = CharReader::new(&bytes[..], UTF_8);
        assert_eq!(drain(reader), "a\u{FFFD}");
    }

    #[test]
    fn test_char_writer_encodes() {
        let mut writer = CharWriter::new(Vec::new(), encoding_rs::GBK);
        writer.write_chars(&['中', 'a']).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, vec![0xD6, 0xD0, b'a']);
    }

    #[test]
    fn test_char_writer_rejects_writes_after_finish() {
        let mut writer = CharWriter::new(Vec::new(), UTF_8);
        writer.write_text("ok").unwrap();
        writer.finish().unwrap();
        assert!(writer.write_text("late").is_err());
        assert_eq!(writer.get_ref(), b"ok");
    }

    #[test]
    fn test_char_writer_discards_bytes_of_failed_write() {
        let mut writer = CharWriter::new(FlakyWriter::new(1), UTF_8);
        assert!(writer.write_text("first").is_err());
        writer.write_text("second").unwrap();
        writer.write_chars(&['!']).unwrap();
        let sink = writer.into_inner().unwrap();
        assert_eq!(sink.into_inner(), b"second!");
    }

    #[test]
    fn test_string_is_a_char_sink() {
        let mut sink = String::new();
        sink.write_chars(&['a', 'b']).unwrap();
        sink.write_text("cd").unwrap();
        assert_eq!(sink, "abcd");
    }
}
