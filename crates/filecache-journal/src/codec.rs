//! Journal record codec
//!
//! Journal format: one JSON object per `\n`-terminated line, in write order.
//! ```text
//! {"key":"user:1","value":"eyJpZCI6MX0=","expiration":1700000060000000000,"created_at":1700000000000000000}
//! {"key":"user:1","value":"eyJpZCI6Mn0=","expiration":1700000120000000000,"created_at":1700000001000000000}
//! ```
//! `value` is base64, the two instants are Unix nanoseconds.

use std::io::BufRead;

use nom::{
    bytes::complete::take_until, character::complete::char, sequence::terminated, IResult,
};
use tracing::warn;

use crate::error::{Error, Result};
use crate::record::CacheRecord;

/// Encode a record as a single newline-terminated line
pub fn encode(record: &CacheRecord) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(record).map_err(|e| Error::Encode(e.to_string()))?;
    line.push(b'\n');
    Ok(line)
}

/// Decode one line (without its newline) into a record
pub fn decode_line(line: &[u8]) -> std::result::Result<CacheRecord, serde_json::Error> {
    serde_json::from_slice(line)
}

/// Parse a single `\n`-terminated line
///
/// Returns the line content without the trailing newline. Fails when the
/// input holds no newline.
pub fn parse_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_until("\n"), char('\n'))(input)
}

/// Lazy decoder over a journal stream
///
/// Yields records in stream order. Stops after the first error.
pub struct RecordDecoder<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl<R: BufRead> RecordDecoder<R> {
    /// Create a decoder reading from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            done: false,
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<CacheRecord>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for RecordDecoder<R> {
    type Item = Result<CacheRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => return self.fail(e.into()),
            }
            self.line += 1;

            // Only the last line of a journal can lack its newline
            let line = match parse_line(&self.buf) {
                Ok((_, line)) => line,
                Err(_) => &self.buf[..],
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return match decode_line(line) {
                Ok(record) => Some(Ok(record)),
                Err(e) => {
                    warn!(line = self.line, error = %e, "corrupt journal record");
                    let err = Error::Decode {
                        line: self.line,
                        message: e.to_string(),
                    };
                    self.fail(err)
                }
            };
        }
    }
}
