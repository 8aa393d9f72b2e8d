//! Best-effort resource release
//!
//! Cleanup paths must not hide the result of the operation they follow, so
//! [`close_quietly`] never reports a failure. Callers that need to know
//! whether buffered data reached its destination must flush explicitly
//! before closing.

use super::chars::CharWriter;
use super::fast_string_writer::FastStringWriter;
use std::io::{self, Write};
use tracing::debug;

/// A resource with an explicit release step
pub trait Closeable {
    /// Release the resource
    fn close(&mut self) -> io::Result<()>;

    /// Push out buffered data ahead of [`close`](Closeable::close). Resources
    /// without buffers keep the default no-op.
    fn flush_before_close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Flush then close `resource`, swallowing both failures. `None` is a no-op.
pub fn close_quietly<C: Closeable + ?Sized>(resource: Option<&mut C>) {
    let Some(resource) = resource else {
        return;
    };
    if let Err(e) = resource.flush_before_close() {
        debug!(error = %e, "Ignoring flush failure during close");
    }
    if let Err(e) = resource.close() {
        debug!(error = %e, "Ignoring close failure");
    }
}

/// [`close_quietly`] every resource in order
pub fn close_all_quietly(resources: &mut [&mut dyn Closeable]) {
    for resource in resources.iter_mut() {
        close_quietly(Some(&mut **resource));
    }
}

impl<C: Closeable + ?Sized> Closeable for Box<C> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        (**self).flush_before_close()
    }
}

impl<C: Closeable + ?Sized> Closeable for &mut C {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        (**self).flush_before_close()
    }
}

impl Closeable for FastStringWriter {
    fn close(&mut self) -> io::Result<()> {
        FastStringWriter::close(self);
        Ok(())
    }
}

impl<W: Write> Closeable for CharWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.finish()
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        super::chars::CharWrite::flush(self)
    }
}

impl Closeable for std::fs::File {
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

impl Closeable for std::net::TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

impl<W: Write> Closeable for io::BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn flush_before_close(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CharWrite;
    use chaos_testing::RecordingCloseable;

    impl Closeable for RecordingCloseable {
        fn close(&mut self) -> io::Result<()> {
            self.record_close()
        }

        fn flush_before_close(&mut self) -> io::Result<()> {
            self.record_flush()
        }
    }

    #[test]
    fn test_flush_happens_before_close() {
        let mut resource = RecordingCloseable::new();
        close_quietly(Some(&mut resource));
        assert_eq!(resource.events(), ["flush", "close"]);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut resource = RecordingCloseable::failing();
        close_quietly(Some(&mut resource));
        // Close still runs after a failed flush
        assert_eq!(resource.events(), ["flush", "close"]);
    }

    #[test]
    fn test_none_is_a_no_op() {
        close_quietly::<RecordingCloseable>(None);
    }

    #[test]
    fn test_close_all_in_order() {
        let mut first = RecordingCloseable::failing();
        let mut second = RecordingCloseable::new();
        close_all_quietly(&mut [&mut first, &mut second]);
        assert_eq!(first.events(), ["flush", "close"]);
        assert_eq!(second.events(), ["flush", "close"]);
    }

    #[test]
    fn test_char_writer_is_finished_on_close() {
        let mut writer = CharWriter::new(Vec::new(), crate::io::charset::UTF_8);
        writer.write_text("bye").unwrap();
        close_quietly(Some(&mut writer));
        assert_eq!(writer.get_ref(), b"bye");
    }

    #[test]
    fn test_file_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"data").unwrap();
        close_quietly(Some(&mut file));
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }
}
