pub mod core;

pub use self::core::{HexBytes, HexError, HexErrorPolicy, decode_hex};
