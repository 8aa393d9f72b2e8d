//! Whole-stream conversions and write helpers built on the copy engine

use super::charset::{resolve_charset, Charset};
use super::chars::{CharRead, CharWrite, CharWriter};
use super::copy::{copy_chars_large, copy_from_chars, copy_large, copy_to_chars};
use super::read::read_fully_to_vec;
use super::{DEFAULT_BUFFER_SIZE, LINE_SEPARATOR};
use crate::Result;
use std::io::{BufRead, Cursor, Read, Write};

/// Read `input` to its end
pub fn to_byte_array<R: Read + ?Sized>(input: &mut R) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    copy_large(input, &mut output)?;
    Ok(output)
}

/// Read exactly `size` bytes; anything after them stays unread
///
/// # Errors
/// `EndOfData` if `input` holds fewer than `size` bytes
pub fn to_byte_array_sized<R: Read + ?Sized>(input: &mut R, size: usize) -> Result<Vec<u8>> {
    read_fully_to_vec(input, size)
}

/// Decode `input` to its end into characters
pub fn to_char_array<R: Read + ?Sized>(input: &mut R, charset: Option<&'static Charset>) -> Result<Vec<char>> {
    Ok(read_to_string(input, charset)?.chars().collect())
}

/// Decode `input` to its end into a string
pub fn read_to_string<R: Read + ?Sized>(input: &mut R, charset: Option<&'static Charset>) -> Result<String> {
    let mut output = String::new();
    copy_to_chars(input, &mut output, charset)?;
    Ok(output)
}

/// Encode a character source to its end into bytes
pub fn chars_to_byte_array<R: CharRead + ?Sized>(input: &mut R, charset: Option<&'static Charset>) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    copy_from_chars(input, &mut output, charset)?;
    Ok(output)
}

/// Drain a character source into a string
pub fn chars_to_string<R: CharRead + ?Sized>(input: &mut R) -> Result<String> {
    let mut output = String::new();
    copy_chars_large(input, &mut output)?;
    Ok(output)
}

/// An in-memory byte source holding `text` encoded with `charset`
pub fn to_input_stream(text: &str, charset: Option<&'static Charset>) -> Result<Cursor<Vec<u8>>> {
    let mut writer = CharWriter::new(Vec::with_capacity(text.len()), resolve_charset(charset));
    writer.write_text(text)?;
    Ok(Cursor::new(writer.into_inner()?))
}

/// Write all of `data` to `output`
pub fn write_bytes<W: Write + ?Sized>(data: &[u8], output: &mut W) -> Result<()> {
    output.write_all(data)?;
    Ok(())
}

/// Write `data` in slices of at most [`DEFAULT_BUFFER_SIZE`] bytes, for sinks
/// that misbehave on very large writes
pub fn write_chunked<W: Write + ?Sized>(data: &[u8], output: &mut W) -> Result<()> {
    for chunk in data.chunks(DEFAULT_BUFFER_SIZE) {
        output.write_all(chunk)?;
    }
    Ok(())
}

/// Decode `data` with `charset` into a character sink
pub fn write_bytes_to_chars<W: CharWrite + ?Sized>(
    data: &[u8],
    output: &mut W,
    charset: Option<&'static Charset>,
) -> Result<()> {
    copy_to_chars(&mut &data[..], output, charset)?;
    Ok(())
}

/// Encode `text` with `charset` into `output` and flush it
pub fn write_text<W: Write + ?Sized>(text: &str, output: &mut W, charset: Option<&'static Charset>) -> Result<()> {
    let mut writer = CharWriter::new(output, resolve_charset(charset));
    writer.write_text(text)?;
    writer.finish()?;
    Ok(())
}

/// Write `text` to a character sink
pub fn write_chars_to<W: CharWrite + ?Sized>(text: &str, output: &mut W) -> Result<()> {
    output.write_text(text)?;
    Ok(())
}

/// Write each line followed by `line_ending` (default `\n`), encoded with
/// `charset`
pub fn write_lines<I, S, W>(
    lines: I,
    line_ending: Option<&str>,
    output: &mut W,
    charset: Option<&'static Charset>,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write + ?Sized,
{
    let line_ending = line_ending.unwrap_or(LINE_SEPARATOR);
    let mut writer = CharWriter::new(output, resolve_charset(charset));
    for line in lines {
        writer.write_text(line.as_ref())?;
        writer.write_text(line_ending)?;
    }
    writer.finish()?;
    Ok(())
}

/// Whether `input` has no more data. Peeks without consuming.
pub fn is_empty<R: BufRead + ?Sized>(input: &mut R) -> Result<bool> {
    Ok(input.fill_buf()?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::charset::{charset_for_name, UTF_8};
    use crate::io::StrReader;
    use chaos_testing::ChunkedReader;
    use std::io::BufReader;

    #[test]
    fn test_to_byte_array() {
        let data: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
        let mut input = ChunkedReader::new(data.clone(), 100);
        assert_eq!(to_byte_array(&mut input).unwrap(), data);
    }

    #[test]
    fn test_to_byte_array_sized() {
        let mut input: &[u8] = b"0123456789";
        assert_eq!(to_byte_array_sized(&mut input, 4).unwrap(), b"0123");
        assert_eq!(input, b"456789");
        assert!(to_byte_array_sized(&mut input, 7).unwrap_err().is_end_of_data());
    }

    #[test]
    fn test_text_conversions() {
        let gbk = charset_for_name("GBK").unwrap();
        let mut encoded = to_input_stream("编码", Some(gbk)).unwrap();
        assert_eq!(encoded.get_ref().len(), 4);
        assert_eq!(read_to_string(&mut encoded, Some(gbk)).unwrap(), "编码");

        let mut input: &[u8] = "añ".as_bytes();
        assert_eq!(to_char_array(&mut input, Some(UTF_8)).unwrap(), vec!['a', 'ñ']);
        assert_eq!(chars_to_string(&mut StrReader::new("drained")).unwrap(), "drained");
    }

    #[test]
    fn test_write_helpers() {
        let mut output = Vec::new();
        write_bytes(b"ab", &mut output).unwrap();
        write_chunked(&vec![b'c'; DEFAULT_BUFFER_SIZE * 2 + 1], &mut output).unwrap();
        assert_eq!(output.len(), 2 + DEFAULT_BUFFER_SIZE * 2 + 1);

        let mut output = Vec::new();
        write_text("ü", &mut output, None).unwrap();
        assert_eq!(output, "ü".as_bytes());

        let mut sink = String::new();
        write_chars_to("chars", &mut sink).unwrap();
        assert_eq!(sink, "chars");
    }

    #[test]
    fn test_conversions_between_chars_and_bytes() {
        let gbk = charset_for_name("GBK").unwrap();
        let encoded = chars_to_byte_array(&mut StrReader::new("中a"), Some(gbk)).unwrap();
        assert_eq!(encoded, vec![0xD6, 0xD0, b'a']);
        assert_eq!(chars_to_byte_array(&mut StrReader::new("é"), None).unwrap(), "é".as_bytes());

        let mut sink = String::new();
        write_bytes_to_chars(&encoded, &mut sink, Some(gbk)).unwrap();
        write_bytes_to_chars(&[0xC3, 0xA9], &mut sink, None).unwrap();
        assert_eq!(sink, "中aé");
    }

    #[test]
    fn test_write_lines() {
        let mut output = Vec::new();
        write_lines(["a", "b"], None, &mut output, None).unwrap();
        assert_eq!(output, b"a\nb\n");

        let mut output = Vec::new();
        write_lines(vec!["x".to_string()], Some("\r\n"), &mut output, None).unwrap();
        assert_eq!(output, b"x\r\n");
    }

    #[test]
    fn test_is_empty_does_not_consume() {
        let mut input = BufReader::new(&b"z"[..]);
        assert!(!is_empty(&mut input).unwrap());
        assert_eq!(to_byte_array(&mut input).unwrap(), b"z");
        assert!(is_empty(&mut input).unwrap());
    }
}
