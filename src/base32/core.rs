use std::fmt;
use std::io::{self, Write};
use std::ops::Deref;

/// Base32 alphabet per RFC 4648
const UPPER_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Same alphabet with letters lower-cased; digits are unchanged.
const LOWER_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

const PAD: &[u8; 6] = b"======";

/// Output is staged in this many bytes before hitting the writer.
/// Multiple of 8 so whole quanta land in each write.
const OUT_CHUNK: usize = 256 * 1024;

/// Letter case of emitted symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterCase {
    #[default]
    Upper,
    Lower,
}

impl LetterCase {
    #[inline]
    fn alphabet(self) -> &'static [u8; 32] {
        match self {
            LetterCase::Upper => UPPER_ALPHABET,
            LetterCase::Lower => LOWER_ALPHABET,
        }
    }
}

/// Encoder policy, fixed for the lifetime of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub case: LetterCase,
    /// Append `=` so the output length is a multiple of 8.
    pub pad: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            case: LetterCase::Upper,
            pad: true,
        }
    }
}

/// Bits of the previous byte still waiting to be emitted.
///
/// The cycle runs None -> Three -> One -> Four -> Two -> None, one step per
/// consumed byte, and covers exactly 40 bits (5 bytes, 8 symbols).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Three,
    One,
    Four,
    Two,
}

impl Pending {
    #[inline]
    fn bits(self) -> u8 {
        match self {
            Pending::None => 0,
            Pending::Three => 3,
            Pending::One => 1,
            Pending::Four => 4,
            Pending::Two => 2,
        }
    }

    /// Number of `=` needed to close the final 8-symbol group.
    #[inline]
    fn pad_len(self) -> usize {
        match self {
            Pending::None => 0,
            Pending::Three => 6,
            Pending::One => 4,
            Pending::Four => 3,
            Pending::Two => 1,
        }
    }
}

/// Symbols produced by a single encoder step. At most one symbol plus six
/// pad characters, so the buffer never spills to the heap.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    buf: [u8; 8],
    len: u8,
}

impl Symbols {
    #[inline]
    fn new() -> Self {
        Symbols {
            buf: [0; 8],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, b: u8) {
        self.buf[self.len as usize] = b;
        self.len += 1;
    }

    #[inline]
    fn extend(&mut self, bytes: &[u8]) {
        let start = self.len as usize;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len() as u8;
    }

    /// Emitted characters as a string slice (always ASCII).
    pub fn as_str(&self) -> &str {
        // Only alphabet and pad bytes are ever pushed.
        std::str::from_utf8(self).unwrap_or_default()
    }
}

impl Deref for Symbols {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl fmt::Debug for Symbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbols({:?})", self.as_str())
    }
}

/// Incremental RFC 4648 Base32 encoder.
///
/// Feed bytes with [`consume`](Self::consume); each call yields one or two
/// symbols. Call [`finalize`](Self::finalize) once after the last byte to emit
/// the trailing partial symbol and padding. `finalize` takes `self`, so a
/// finished encoder cannot be fed again.
#[derive(Debug, Clone)]
pub struct Base32Encoder {
    alphabet: &'static [u8; 32],
    pad: bool,
    pending: Pending,
    /// Unconsumed bits, left-aligned as they sat in the source byte.
    carry: u8,
}

impl Base32Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Base32Encoder {
            alphabet: config.case.alphabet(),
            pad: config.pad,
            pending: Pending::None,
            carry: 0,
        }
    }

    /// Number of carried bits waiting for the next byte (0..=4).
    #[inline]
    pub fn phase(&self) -> u8 {
        self.pending.bits()
    }

    #[inline]
    fn symbol(&self, index: u8) -> u8 {
        self.alphabet[(index & 0x1F) as usize]
    }

    /// Consume one byte and return the symbols it completes.
    #[inline]
    pub fn consume(&mut self, byte: u8) -> Symbols {
        let mut out = Symbols::new();
        // `carry >> 3` moves the pending bits to the top of a 5-bit group.
        let high = self.carry >> 3;
        match self.pending {
            Pending::None => {
                out.push(self.symbol(byte >> 3));
                self.carry = byte << 5;
                self.pending = Pending::Three;
            }
            Pending::Three => {
                out.push(self.symbol(high | byte >> 6));
                out.push(self.symbol(byte >> 1));
                self.carry = byte << 7;
                self.pending = Pending::One;
            }
            Pending::One => {
                out.push(self.symbol(high | byte >> 4));
                self.carry = byte << 4;
                self.pending = Pending::Four;
            }
            Pending::Four => {
                out.push(self.symbol(high | byte >> 7));
                out.push(self.symbol(byte >> 2));
                self.carry = byte << 6;
                self.pending = Pending::Two;
            }
            Pending::Two => {
                out.push(self.symbol(high | byte >> 5));
                out.push(self.symbol(byte));
                self.carry = 0;
                self.pending = Pending::None;
            }
        }
        out
    }

    /// Flush the trailing partial group, zero-filled, plus padding if enabled.
    pub fn finalize(self) -> Symbols {
        let mut out = Symbols::new();
        if self.pending == Pending::None {
            return out;
        }
        out.push(self.symbol(self.carry >> 3));
        if self.pad {
            out.extend(&PAD[..self.pending.pad_len()]);
        }
        out
    }
}

impl Default for Base32Encoder {
    fn default() -> Self {
        Base32Encoder::new(EncoderConfig::default())
    }
}

/// Exact number of output characters for `len` input bytes.
pub const fn encoded_len(len: usize, pad: bool) -> usize {
    if pad {
        return len.div_ceil(5) * 8;
    }
    let tail = match len % 5 {
        0 => 0,
        1 => 2,
        2 => 4,
        3 => 5,
        _ => 7,
    };
    (len / 5) * 8 + tail
}

/// Encode a complete slice in one call.
pub fn encode(data: &[u8], config: EncoderConfig) -> String {
    let mut enc = Base32Encoder::new(config);
    let mut out = String::with_capacity(encoded_len(data.len(), config.pad));
    for &b in data {
        out.push_str(enc.consume(b).as_str());
    }
    out.push_str(enc.finalize().as_str());
    out
}

/// Stream `data` through a fresh encoder into `out`.
/// Symbols are staged in a reusable buffer and written in large chunks.
pub fn encode_to_writer(
    data: &[u8],
    config: EncoderConfig,
    out: &mut impl Write,
) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let mut enc = Base32Encoder::new(config);
    let mut buf = Vec::with_capacity(OUT_CHUNK + 8);
    for &b in data {
        buf.extend_from_slice(&enc.consume(b));
        if buf.len() >= OUT_CHUNK {
            out.write_all(&buf)?;
            buf.clear();
        }
    }
    buf.extend_from_slice(&enc.finalize());
    out.write_all(&buf)
}
