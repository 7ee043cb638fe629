pub mod core;

pub use self::core::{
    Base32Encoder, EncoderConfig, LetterCase, Symbols, encode, encode_to_writer, encoded_len,
};
