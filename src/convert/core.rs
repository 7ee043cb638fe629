use std::io::{self, Read, Write};

use thiserror::Error;

use crate::base32::{Base32Encoder, EncoderConfig};
use crate::common::io_error_msg;
use crate::hex::{HexBytes, HexError, HexErrorPolicy};

/// Symbols are staged here before each write; sized for a few large syscalls
/// per megabyte of hex input.
const OUT_CHUNK: usize = 256 * 1024;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Input(#[from] HexError),
    #[error("write error: {}", io_error_msg(.0))]
    Write(io::Error),
}

impl ConvertError {
    /// True when the sink went away (e.g. the reader of a pipe exited).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ConvertError::Write(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Counters for one completed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Bytes decoded from the hex input and fed to the encoder.
    pub bytes_in: u64,
    /// Characters written, padding included.
    pub symbols_out: u64,
}

/// Decode hexadecimal text from `input` and write its Base32 encoding to `out`.
///
/// Output is streamed: memory use does not grow with input size. If the hex
/// source fails, everything encoded so far is still written, the trailing
/// partial group is left unflushed, and the error is returned.
pub fn hex_to_base32<R: Read, W: Write>(
    input: R,
    policy: HexErrorPolicy,
    config: EncoderConfig,
    out: &mut W,
) -> Result<Summary, ConvertError> {
    bytes_to_base32(HexBytes::new(input, policy), config, out)
}

/// Feed an already-decoded byte stream through a fresh encoder into `out`.
pub fn bytes_to_base32<I, W>(
    bytes: I,
    config: EncoderConfig,
    out: &mut W,
) -> Result<Summary, ConvertError>
where
    I: IntoIterator<Item = Result<u8, HexError>>,
    W: Write,
{
    let mut enc = Base32Encoder::new(config);
    let mut buf: Vec<u8> = Vec::with_capacity(OUT_CHUNK + 8);
    let mut summary = Summary::default();

    for item in bytes {
        let byte = match item {
            Ok(b) => b,
            Err(e) => {
                summary.symbols_out += buf.len() as u64;
                out.write_all(&buf).map_err(ConvertError::Write)?;
                return Err(e.into());
            }
        };
        summary.bytes_in += 1;
        buf.extend_from_slice(&enc.consume(byte));
        if buf.len() >= OUT_CHUNK {
            summary.symbols_out += buf.len() as u64;
            out.write_all(&buf).map_err(ConvertError::Write)?;
            buf.clear();
        }
    }

    buf.extend_from_slice(&enc.finalize());
    summary.symbols_out += buf.len() as u64;
    out.write_all(&buf).map_err(ConvertError::Write)?;
    Ok(summary)
}
