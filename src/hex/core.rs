use std::io::{self, Read};
use std::iter::FusedIterator;

use thiserror::Error;

use crate::common::io_error_msg;

/// Read chunk for the underlying reader. Input is never held beyond one chunk.
const READ_CHUNK: usize = 64 * 1024;

const INVALID: u8 = 0xFF;

/// Build a decoding table: maps ASCII byte -> nibble value (0-15), 0xFF for invalid.
const fn build_nibble_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 10 {
        table[(b'0' + i) as usize] = i;
        i += 1;
    }
    let mut i = 0;
    while i < 6 {
        table[(b'a' + i) as usize] = 10 + i;
        table[(b'A' + i) as usize] = 10 + i;
        i += 1;
    }
    table
}

const NIBBLE_TABLE: [u8; 256] = build_nibble_table();

/// What to do with a character that is not a hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexErrorPolicy {
    /// Drop it and keep reading.
    #[default]
    Skip,
    /// Report it and end the stream.
    Fatal,
}

#[derive(Debug, Error)]
pub enum HexError {
    #[error("invalid hexadecimal character '{}'", as_char(.0))]
    InvalidCharacter(u8),
    #[error("must provide an even number of hexadecimal characters")]
    IncompletePair,
    #[error("{}", io_error_msg(.0))]
    Io(#[from] io::Error),
}

fn as_char(c: &u8) -> char {
    char::from(*c)
}

/// Pull-based decoder from hexadecimal text to bytes.
///
/// Each item is one byte built from two digits, high nibble first. Digits are
/// case-insensitive. After the first error the iterator is exhausted, so a
/// consumer never sees bytes that follow a fatal condition.
pub struct HexBytes<R> {
    reader: R,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    policy: HexErrorPolicy,
    done: bool,
}

impl<R: Read> HexBytes<R> {
    pub fn new(reader: R, policy: HexErrorPolicy) -> Self {
        Self::with_capacity(reader, policy, READ_CHUNK)
    }

    pub fn with_capacity(reader: R, policy: HexErrorPolicy, capacity: usize) -> Self {
        HexBytes {
            reader,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            len: 0,
            policy,
            done: false,
        }
    }

    /// Refill the buffer. Returns false at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Value of the next valid digit, or None at end of input.
    fn next_digit(&mut self) -> Result<Option<u8>, HexError> {
        loop {
            if self.pos == self.len && !self.fill()? {
                return Ok(None);
            }
            let c = self.buf[self.pos];
            self.pos += 1;
            let v = NIBBLE_TABLE[c as usize];
            if v != INVALID {
                return Ok(Some(v));
            }
            if self.policy == HexErrorPolicy::Fatal {
                return Err(HexError::InvalidCharacter(c));
            }
        }
    }
}

impl<R: Read> Iterator for HexBytes<R> {
    type Item = Result<u8, HexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.next_digit() {
            Ok(None) => None,
            Ok(Some(hi)) => match self.next_digit() {
                Ok(Some(lo)) => Some(Ok(hi << 4 | lo)),
                Ok(None) => Some(Err(HexError::IncompletePair)),
                Err(e) => Some(Err(e)),
            },
            Err(e) => Some(Err(e)),
        };
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<R: Read> FusedIterator for HexBytes<R> {}

/// Decode a complete hex text in memory.
pub fn decode_hex(text: &[u8], policy: HexErrorPolicy) -> Result<Vec<u8>, HexError> {
    HexBytes::with_capacity(text, policy, text.len()).collect()
}
