pub mod core;

pub use self::core::{ConvertError, Summary, bytes_to_base32, hex_to_base32};
