/// Use mimalloc as the global allocator for the binary and tests.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod base32;
pub mod common;
pub mod convert;
pub mod hex;
