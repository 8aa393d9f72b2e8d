//! Line-oriented decoding
//!
//! Lines end at `\n`, `\r` or `\r\n`; the terminator is not part of the line.
//! The last line does not need a terminator.

use super::charset::{resolve_charset, Charset};
use super::chars::{CharRead, CharReader};
use crate::Result;
use std::io::{ErrorKind, Read};

const LINE_BUFFER_SIZE: usize = 1024;

/// Lazily splits a character source into lines
#[derive(Debug)]
pub struct LineReader<C> {
    inner: C,
    buf: Box<[char]>,
    pos: usize,
    len: usize,
    /// Last line ended with `\r`; drop a following `\n`
    skip_lf: bool,
}

impl<C: CharRead> LineReader<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            buf: vec!['\0'; LINE_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            len: 0,
            skip_lf: false,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    /// The next line, or `None` once the source is exhausted
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let mut started = false;
        loop {
            if self.pos == self.len && !self.fill()? {
                return Ok(started.then_some(line));
            }
            let c = self.buf[self.pos];
            self.pos += 1;

            if self.skip_lf {
                self.skip_lf = false;
                if c == '\n' {
                    continue;
                }
            }
            match c {
                '\n' => return Ok(Some(line)),
                '\r' => {
                    self.skip_lf = true;
                    return Ok(Some(line));
                }
                _ => {
                    line.push(c);
                    started = true;
                }
            }
        }
    }

    /// Refill the buffer, `false` at end of data
    fn fill(&mut self) -> Result<bool> {
        loop {
            match self.inner.read_chars(&mut self.buf) {
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<C: CharRead> Iterator for LineReader<C> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Decode `input` with `charset` and collect all of its lines
pub fn read_lines<R: Read>(input: R, charset: Option<&'static Charset>) -> Result<Vec<String>> {
    lines(input, charset).collect()
}

/// Collect all lines of a character source
pub fn read_lines_from_chars<C: CharRead>(input: C) -> Result<Vec<String>> {
    LineReader::new(input).collect()
}

/// Lazy counterpart of [`read_lines`]
pub fn lines<R: Read>(input: R, charset: Option<&'static Charset>) -> LineReader<CharReader<R>> {
    LineReader::new(CharReader::new(input, resolve_charset(charset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::charset::UTF_16BE;
    use crate::io::StrReader;

    fn split(text: &str) -> Vec<String> {
        read_lines_from_chars(StrReader::new(text)).unwrap()
    }

    #[test]
    fn test_all_terminators() {
        assert_eq!(split("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        assert_eq!(split("\n\nx\n"), vec!["", "", "x"]);
        assert_eq!(split("a\r\r\nb"), vec!["a", "", "b"]);
        assert_eq!(split("a\n\r\n"), vec!["a", ""]);
    }

    #[test]
    fn test_trailing_terminator_adds_no_line() {
        assert_eq!(split("one\r\n"), vec!["one"]);
        assert_eq!(split("one"), vec!["one"]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_crlf_split_across_buffer_refill() {
        let mut text = "x".repeat(LINE_BUFFER_SIZE - 1);
        text.push_str("\r\nnext");
        let lines = split(&text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "next");
    }

    #[test]
    fn test_read_lines_decodes_bytes() {
        let bytes: Vec<u8> = "第一行\n第二行"
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();
        let lines = read_lines(&bytes[..], Some(UTF_16BE)).unwrap();
        assert_eq!(lines, vec!["第一行", "第二行"]);
    }

    #[test]
    fn test_lazy_iteration() {
        let mut iter = lines(&b"first\nsecond\n"[..], None);
        assert_eq!(iter.next().unwrap().unwrap(), "first");
        assert_eq!(iter.next().unwrap().unwrap(), "second");
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }
}
