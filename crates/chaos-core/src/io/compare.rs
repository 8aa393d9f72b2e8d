//! Content comparison of two sources
//!
//! Passing the same source twice cannot happen here: both arguments are
//! exclusive borrows, so the "compared to itself" case never reaches these
//! functions.

use super::chars::CharRead;
use super::lines::LineReader;
use crate::Result;
use std::io::{BufRead, BufReader, Read};

/// Compare two byte sources unit by unit. Equal when both end at the same
/// position without a mismatch; chunk boundaries do not matter.
pub fn content_equals<A, B>(input1: &mut A, input2: &mut B) -> Result<bool>
where
    A: Read + ?Sized,
    B: Read + ?Sized,
{
    let mut reader1 = BufReader::new(input1);
    let mut reader2 = BufReader::new(input2);
    loop {
        let (n, same) = {
            let chunk1 = reader1.fill_buf()?;
            let chunk2 = reader2.fill_buf()?;
            if chunk1.is_empty() || chunk2.is_empty() {
                return Ok(chunk1.is_empty() && chunk2.is_empty());
            }
            let n = chunk1.len().min(chunk2.len());
            (n, chunk1[..n] == chunk2[..n])
        };
        if !same {
            return Ok(false);
        }
        reader1.consume(n);
        reader2.consume(n);
    }
}

/// Compare two character sources unit by unit
pub fn content_equals_chars<A, B>(input1: &mut A, input2: &mut B) -> Result<bool>
where
    A: CharRead + ?Sized,
    B: CharRead + ?Sized,
{
    loop {
        let c1 = input1.read_char()?;
        let c2 = input2.read_char()?;
        if c1 != c2 {
            return Ok(false);
        }
        if c1.is_none() {
            return Ok(true);
        }
    }
}

/// Compare two character sources line by line, ignoring how each line was
/// terminated. Equal when both yield the same lines in the same order and the
/// same number of them.
pub fn content_equals_ignore_eol<A, B>(input1: &mut A, input2: &mut B) -> Result<bool>
where
    A: CharRead + ?Sized,
    B: CharRead + ?Sized,
{
    let mut lines1 = LineReader::new(input1);
    let mut lines2 = LineReader::new(input2);
    loop {
        let line1 = lines1.next_line()?;
        let line2 = lines2.next_line()?;
        if line1 != line2 {
            return Ok(false);
        }
        if line1.is_none() {
            return Ok(true);
        }
    }
}
