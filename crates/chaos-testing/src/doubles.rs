//! Readers, writers and resources with scripted behaviour

use std::io::{self, ErrorKind, Read, Write};

/// Serves its data at most `chunk` bytes per read, counting what it hands out
#[derive(Debug)]
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk: chunk.max(1),
        }
    }

    /// Bytes handed out so far
    pub fn bytes_read(&self) -> usize {
        self.pos
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Fails every other read with `Interrupted`, starting with the first
#[derive(Debug)]
pub struct InterruptingReader {
    data: Vec<u8>,
    pos: usize,
    interrupt_next: bool,
}

impl InterruptingReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            interrupt_next: true,
        }
    }
}

impl Read for InterruptingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let interrupt = self.interrupt_next;
        self.interrupt_next = !interrupt;
        if interrupt {
            return Err(io::Error::new(ErrorKind::Interrupted, "interrupted"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Accepts at most `max` bytes per write call
#[derive(Debug, Default)]
pub struct ShortWriter {
    written: Vec<u8>,
    max: usize,
}

impl ShortWriter {
    pub fn new(max: usize) -> Self {
        Self {
            written: Vec::new(),
            max: max.max(1),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.written
    }
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Every write and flush fails with the configured kind
#[derive(Debug)]
pub struct FailingWriter {
    kind: ErrorKind,
}

impl FailingWriter {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(self.kind, "sink failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(self.kind, "sink failure"))
    }
}

/// Fails its first `failures` writes, then keeps everything it is given
#[derive(Debug, Default)]
pub struct FlakyWriter {
    failures: usize,
    written: Vec<u8>,
}

impl FlakyWriter {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            written: Vec::new(),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.written
    }
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(io::Error::new(ErrorKind::BrokenPipe, "transient sink failure"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records flush and close calls in order; optionally fails both
///
/// Crates implement their own close trait on top of
/// [`record_flush`](Self::record_flush) and [`record_close`](Self::record_close).
#[derive(Debug, Default)]
pub struct RecordingCloseable {
    events: Vec<&'static str>,
    fail: bool,
}

impl RecordingCloseable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
        }
    }

    pub fn record_flush(&mut self) -> io::Result<()> {
        self.record("flush")
    }

    pub fn record_close(&mut self) -> io::Result<()> {
        self.record("close")
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.clone()
    }

    fn record(&mut self, event: &'static str) -> io::Result<()> {
        self.events.push(event);
        if self.fail {
            Err(io::Error::new(ErrorKind::Other, format!("{} failed", event)))
        } else {
            Ok(())
        }
    }
}
