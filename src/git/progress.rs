//! Parsing of the human-readable progress stream git writes to stderr

use std::io::{self, BufRead, BufReader, Read};

/// Extract the percentage from one line of git progress output.
///
/// Returns the last `<int>%` token on the line, clamped to 100.
/// Lines without such a token (or with a fractional one) yield `None`.
pub fn parse_progress_line(line: &str) -> Option<u8> {
    let bytes = line.as_bytes();
    let mut last = None;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'%' {
            continue;
        }

        let start = bytes[..i]
            .iter()
            .rposition(|c| !c.is_ascii_digit())
            .map_or(0, |p| p + 1);
        if start == i {
            continue;
        }
        // "12.5%" is not an integer token
        if start > 0 && bytes[start - 1] == b'.' {
            continue;
        }

        // All digits, so a parse failure can only be overflow
        let value = line[start..i]
            .parse::<u32>()
            .map_or(100, |value| value.min(100) as u8);
        last = Some(value);
    }

    last
}

/// Splits a byte stream into lines on either `\n` or `\r`.
///
/// git redraws its progress meter with bare carriage returns, so plain
/// `BufRead::lines` would deliver a whole clone phase as a single line.
/// Empty segments (e.g. between `\r\n`) are skipped.
pub struct ProgressLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: Read> ProgressLines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

impl<R: Read> Iterator for ProgressLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };

            if available.is_empty() {
                if self.buf.is_empty() {
                    return None;
                }
                return Some(Ok(self.take_line()));
            }

            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(pos) => {
                    self.buf.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    if !self.buf.is_empty() {
                        return Some(Ok(self.take_line()));
                    }
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }
}
