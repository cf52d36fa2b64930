//! Splits file content into lines.
//!
//! Both `\n` and `\r` terminate a line, and any run of them counts as a single
//! boundary, so `\r\n`, blank lines and leading or trailing terminators never
//! produce empty lines. Bytes are not decoded here.

use std::iter::FusedIterator;

#[inline]
fn is_line_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Iterator over the non-empty lines of a byte buffer.
///
/// The scan keeps no state beyond its position: a clone continues where the
/// original is, and calling [`lines`] again starts over.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    remaining: &'a [u8],
}

/// Lazily split `buffer` into lines.
pub fn lines(buffer: &[u8]) -> Lines<'_> {
    Lines { remaining: buffer }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let Some(start) = self.remaining.iter().position(|&b| !is_line_terminator(b)) else {
            self.remaining = &[];
            return None;
        };

        let rest = &self.remaining[start..];
        let end = rest
            .iter()
            .position(|&b| is_line_terminator(b))
            .unwrap_or(rest.len());
        let (line, tail) = rest.split_at(end);
        self.remaining = tail;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // At most one line per two bytes, plus a possible unterminated tail.
        let upper = (self.remaining.len() + 1) / 2;
        (0, Some(upper))
    }
}

impl FusedIterator for Lines<'_> {}
