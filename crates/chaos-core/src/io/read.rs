//! Exact-count reads and skips
//!
//! Neither `Read::read` nor [`CharRead::read_chars`] promise to fill the
//! whole buffer in one call. The functions here loop until the request is
//! satisfied or the source runs dry. The `_fully` variants turn a short result
//! into [`Error::EndOfData`].

use super::chars::CharRead;
use super::SKIP_BUFFER_SIZE;
use crate::{Error, Result};
use std::io::{ErrorKind, Read};
use tracing::trace;

/// Fill `buffer` from `input`, returning how many bytes were read. Less than
/// `buffer.len()` only at end of data.
pub fn read<R: Read + ?Sized>(input: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buffer.len() {
        match input.read(&mut buffer[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

/// Like [`read`], into `buffer[offset..offset + length]`
///
/// # Errors
/// `InvalidArgument` if `offset` or `length` is negative or the range does not
/// fit in `buffer`; checked before reading
pub fn read_range<R: Read + ?Sized>(
    input: &mut R,
    buffer: &mut [u8],
    offset: i64,
    length: i64,
) -> Result<usize> {
    let range = checked_range(buffer.len(), offset, length)?;
    read(input, &mut buffer[range])
}

/// Fill `buffer` from `input`
///
/// # Errors
/// `EndOfData` if the source ends first. The bytes read up to that point are
/// left at the start of `buffer`.
pub fn read_fully<R: Read + ?Sized>(input: &mut R, buffer: &mut [u8]) -> Result<()> {
    let actual = read(input, buffer)?;
    if actual != buffer.len() {
        return Err(Error::EndOfData {
            expected: buffer.len() as u64,
            actual: actual as u64,
        });
    }
    Ok(())
}

/// Like [`read_fully`], into `buffer[offset..offset + length]`
pub fn read_fully_range<R: Read + ?Sized>(
    input: &mut R,
    buffer: &mut [u8],
    offset: i64,
    length: i64,
) -> Result<()> {
    let range = checked_range(buffer.len(), offset, length)?;
    read_fully(input, &mut buffer[range])
}

/// Read exactly `length` bytes into a new vector
pub fn read_fully_to_vec<R: Read + ?Sized>(input: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0; length];
    read_fully(input, &mut buffer)?;
    Ok(buffer)
}

/// Fill `buffer` from a character source, returning how many characters were
/// read
pub fn read_chars<R: CharRead + ?Sized>(input: &mut R, buffer: &mut [char]) -> Result<usize> {
    let mut total = 0;
    while total < buffer.len() {
        match input.read_chars(&mut buffer[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

/// Fill `buffer` from a character source
///
/// # Errors
/// `EndOfData` if the source ends first
pub fn read_chars_fully<R: CharRead + ?Sized>(input: &mut R, buffer: &mut [char]) -> Result<()> {
    let actual = read_chars(input, buffer)?;
    if actual != buffer.len() {
        return Err(Error::EndOfData {
            expected: buffer.len() as u64,
            actual: actual as u64,
        });
    }
    Ok(())
}

/// Discard up to `to_skip` bytes, returning how many were actually skipped.
///
/// The bytes are read and thrown away rather than trusting a native skip,
/// which may legally skip less than asked.
///
/// # Errors
/// `InvalidArgument` if `to_skip` is negative
pub fn skip<R: Read + ?Sized>(input: &mut R, to_skip: i64) -> Result<u64> {
    let mut scratch = [0u8; SKIP_BUFFER_SIZE];
    skip_with_buffer(input, to_skip, &mut scratch)
}

/// [`skip`] using a caller-supplied scratch buffer
pub fn skip_with_buffer<R: Read + ?Sized>(
    input: &mut R,
    to_skip: i64,
    scratch: &mut [u8],
) -> Result<u64> {
    let to_skip = non_negative("Skip count", to_skip)?;
    if scratch.is_empty() && to_skip > 0 {
        return Err(Error::InvalidArgument("Skip buffer must not be empty".to_string()));
    }

    let mut remaining = to_skip;
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        match input.read(&mut scratch[..chunk]) {
            Ok(0) => break,
            Ok(n) => remaining -= n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let skipped = to_skip - remaining;
    trace!(requested = to_skip, skipped, "Skipped bytes");
    Ok(skipped)
}

/// Discard exactly `to_skip` bytes
///
/// # Errors
/// `InvalidArgument` if `to_skip` is negative, `EndOfData` if the source ends
/// first
pub fn skip_fully<R: Read + ?Sized>(input: &mut R, to_skip: i64) -> Result<()> {
    let actual = skip(input, to_skip)?;
    expect_skipped(to_skip, actual)
}

/// [`skip_fully`] using a caller-supplied scratch buffer
pub fn skip_fully_with_buffer<R: Read + ?Sized>(input: &mut R, to_skip: i64, scratch: &mut [u8]) -> Result<()> {
    let actual = skip_with_buffer(input, to_skip, scratch)?;
    expect_skipped(to_skip, actual)
}

/// Discard up to `to_skip` characters, returning how many were skipped
pub fn skip_chars<R: CharRead + ?Sized>(input: &mut R, to_skip: i64) -> Result<u64> {
    let to_skip = non_negative("Skip count", to_skip)?;
    let mut scratch = ['\0'; SKIP_BUFFER_SIZE];

    let mut remaining = to_skip;
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        match input.read_chars(&mut scratch[..chunk]) {
            Ok(0) => break,
            Ok(n) => remaining -= n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(to_skip - remaining)
}

/// Discard exactly `to_skip` characters
pub fn skip_chars_fully<R: CharRead + ?Sized>(input: &mut R, to_skip: i64) -> Result<()> {
    let actual = skip_chars(input, to_skip)?;
    expect_skipped(to_skip, actual)
}

fn expect_skipped(expected: i64, actual: u64) -> Result<()> {
    // `expected` was validated as non-negative by the caller
    let expected = expected as u64;
    if actual != expected {
        return Err(Error::EndOfData { expected, actual });
    }
    Ok(())
}

pub(crate) fn non_negative(what: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} must not be negative: {}", what, value)))
}

/// Validate a signed `(offset, length)` pair against an array of `size`
pub(crate) fn checked_range(size: usize, offset: i64, length: i64) -> Result<std::ops::Range<usize>> {
    let offset = non_negative("Offset", offset)?;
    let length = non_negative("Length", length)?;
    let end = offset
        .checked_add(length)
        .filter(|end| *end <= size as u64)
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Range {}+{} exceeds buffer of {}",
                offset, length, size
            ))
        })?;
    Ok(offset as usize..end as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::StrReader;
    use chaos_testing::ChunkedReader;

    #[test]
    fn test_read_across_short_reads() {
        let data: Vec<u8> = (0..100).collect();
        let mut input = ChunkedReader::new(data.clone(), 7);
        let mut buffer = [0u8; 64];
        assert_eq!(read(&mut input, &mut buffer).unwrap(), 64);
        assert_eq!(&buffer[..], &data[..64]);
        assert_eq!(read(&mut input, &mut buffer).unwrap(), 36);
        assert_eq!(&buffer[..36], &data[64..]);
        assert_eq!(read(&mut input, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_read_range_validates_before_reading() {
        let mut input = ChunkedReader::new(b"abcdef".to_vec(), 2);
        let mut buffer = [0u8; 4];
        assert!(matches!(
            read_range(&mut input, &mut buffer, -1, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            read_range(&mut input, &mut buffer, 0, -2),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            read_range(&mut input, &mut buffer, 3, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(input.bytes_read(), 0);

        assert_eq!(read_range(&mut input, &mut buffer, 1, 3).unwrap(), 3);
        assert_eq!(&buffer, b"\0abc");
    }

    #[test]
    fn test_read_fully_short_source_keeps_prefix() {
        let mut input = ChunkedReader::new(b"1234567".to_vec(), 3);
        let mut buffer = [0u8; 10];
        match read_fully(&mut input, &mut buffer) {
            Err(Error::EndOfData { expected, actual }) => {
                assert_eq!(expected, 10);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(&buffer[..7], b"1234567");
    }

    #[test]
    fn test_read_fully_to_vec() {
        let mut input: &[u8] = b"hello world";
        assert_eq!(read_fully_to_vec(&mut input, 5).unwrap(), b"hello");
        assert!(read_fully_to_vec(&mut input, 10).unwrap_err().is_end_of_data());
    }

    #[test]
    fn test_read_fully_range() {
        let mut input: &[u8] = b"xyz";
        let mut buffer = [b'.'; 5];
        read_fully_range(&mut input, &mut buffer, 1, 3).unwrap();
        assert_eq!(&buffer, b".xyz.");
    }

    #[test]
    fn test_read_chars_and_fully() {
        let mut input = StrReader::new("abcdé");
        let mut buffer = ['\0'; 3];
        assert_eq!(read_chars(&mut input, &mut buffer).unwrap(), 3);
        assert_eq!(buffer, ['a', 'b', 'c']);
        let err = read_chars_fully(&mut input, &mut buffer).unwrap_err();
        assert!(matches!(err, Error::EndOfData { expected: 3, actual: 2 }));
        assert_eq!(&buffer[..2], &['d', 'é']);
    }

    #[test]
    fn test_skip_returns_remaining_at_end() {
        let mut input = ChunkedReader::new(vec![1u8; 10], 4);
        assert_eq!(skip(&mut input, 3).unwrap(), 3);
        assert_eq!(skip(&mut input, 100).unwrap(), 7);
        assert_eq!(skip(&mut input, 5).unwrap(), 0);
    }

    #[test]
    fn test_skip_large_count_crosses_scratch_buffer() {
        let data = vec![9u8; SKIP_BUFFER_SIZE * 3 + 17];
        let mut input = &data[..];
        assert_eq!(skip(&mut input, (SKIP_BUFFER_SIZE * 3) as i64).unwrap(), (SKIP_BUFFER_SIZE * 3) as u64);
        assert_eq!(input.len(), 17);
    }

    #[test]
    fn test_skip_rejects_negative() {
        let mut input: &[u8] = b"abc";
        assert!(matches!(skip(&mut input, -1), Err(Error::InvalidArgument(_))));
        assert!(matches!(skip_fully(&mut input, -1), Err(Error::InvalidArgument(_))));
        assert_eq!(input, b"abc");
    }

    #[test]
    fn test_skip_with_buffer() {
        let mut input: &[u8] = b"abcdefgh";
        let mut scratch = [0u8; 3];
        assert_eq!(skip_with_buffer(&mut input, 5, &mut scratch).unwrap(), 5);
        assert_eq!(input, b"fgh");
        assert!(skip_with_buffer(&mut input, 1, &mut [0u8; 0]).is_err());
        assert_eq!(skip_with_buffer(&mut input, 0, &mut [0u8; 0]).unwrap(), 0);
    }

    #[test]
    fn test_skip_fully_fails_on_short_source() {
        let mut input: &[u8] = b"abc";
        skip_fully(&mut input, 2).unwrap();
        let err = skip_fully(&mut input, 5).unwrap_err();
        assert!(matches!(err, Error::EndOfData { expected: 5, actual: 1 }));
    }

    #[test]
    fn test_skip_chars() {
        let mut input = StrReader::new("ünïcode");
        assert_eq!(skip_chars(&mut input, 3).unwrap(), 3);
        assert_eq!(input.remaining(), "code");
        assert_eq!(skip_chars(&mut input, 10).unwrap(), 4);
        assert!(skip_chars_fully(&mut input, 1).unwrap_err().is_end_of_data());
        assert!(matches!(skip_chars(&mut input, -3), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let mut input = chaos_testing::InterruptingReader::new(b"retry".to_vec());
        let mut buffer = [0u8; 5];
        read_fully(&mut input, &mut buffer).unwrap();
        assert_eq!(&buffer, b"retry");
    }
}
