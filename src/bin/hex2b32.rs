// hex2b32 — convert hexadecimal text to Base32 (RFC 4648 / RFC 3548)

use std::io::{self, BufWriter, Write};
#[cfg(unix)]
use std::mem::ManuallyDrop;
#[cfg(unix)]
use std::os::unix::io::FromRawFd;
use std::process;

use clap::Parser;

use hex2b32::base32::{EncoderConfig, LetterCase};
use hex2b32::common::io::open_input;
use hex2b32::common::io_error_msg;
use hex2b32::convert::{self, ConvertError};
use hex2b32::hex::{HexError, HexErrorPolicy};

const TOOL_NAME: &str = "hex2b32";

#[derive(Parser)]
#[command(
    name = "hex2b32",
    about = "Convert hexadecimal data from FILE, or standard input, to base32 (RFC 3548) on standard output.",
    after_help = "With no FILE, or when FILE is -, read standard input.\n\n\
        Every two hexadecimal digits form one byte. By default any character that\n\
        is not a hexadecimal digit is ignored; use --input-errors to reject it.\n\
        An odd number of hexadecimal digits is always an error.",
    version
)]
struct Cli {
    /// Display the first input error and exit with failure
    /// (default behavior is to ignore invalid input)
    #[arg(short = 'e', long = "input-errors")]
    input_errors: bool,

    /// Omit trailing '=' symbols
    #[arg(short = 'n', long = "no-padding")]
    no_padding: bool,

    /// Output lower-case letters
    #[arg(short = 'l', long = "lowercase")]
    lowercase: bool,

    /// File to process (reads stdin if omitted or -)
    file: Option<String>,
}

impl Cli {
    fn policy(&self) -> HexErrorPolicy {
        if self.input_errors {
            HexErrorPolicy::Fatal
        } else {
            HexErrorPolicy::Skip
        }
    }

    fn config(&self) -> EncoderConfig {
        EncoderConfig {
            case: if self.lowercase {
                LetterCase::Lower
            } else {
                LetterCase::Upper
            },
            pad: !self.no_padding,
        }
    }
}

fn main() {
    hex2b32::common::reset_sigpipe();

    #[cfg(target_os = "linux")]
    hex2b32::common::io::enlarge_pipes();

    let cli = Cli::parse();

    let filename = cli.file.as_deref().unwrap_or("-");
    let display_name = if filename == "-" {
        "standard input"
    } else {
        filename
    };

    let input = match open_input(filename) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}: {}: {}", TOOL_NAME, display_name, io_error_msg(&e));
            process::exit(1);
        }
    };

    #[cfg(unix)]
    let stdout_raw = unsafe { ManuallyDrop::new(std::fs::File::from_raw_fd(1)) };
    #[cfg(unix)]
    let mut out = BufWriter::with_capacity(256 * 1024, &*stdout_raw);
    #[cfg(not(unix))]
    let stdout = io::stdout();
    #[cfg(not(unix))]
    let mut out = BufWriter::with_capacity(256 * 1024, stdout.lock());

    let result = convert::hex_to_base32(input, cli.policy(), cli.config(), &mut out);

    let had_error = match result {
        Ok(_) => {
            if let Err(e) = out.write_all(b"\n") {
                report_write_error(&e);
            }
            false
        }
        Err(e) if e.is_broken_pipe() => process::exit(0),
        Err(ConvertError::Input(HexError::Io(e))) => {
            eprintln!("{}: {}: {}", TOOL_NAME, display_name, io_error_msg(&e));
            true
        }
        Err(e) => {
            eprintln!("{}: {}", TOOL_NAME, e);
            true
        }
    };

    if let Err(e) = out.flush() {
        report_write_error(&e);
    }

    if had_error {
        process::exit(1);
    }
}

fn report_write_error(e: &io::Error) -> ! {
    if e.kind() == io::ErrorKind::BrokenPipe {
        process::exit(0);
    }
    eprintln!("{}: write error: {}", TOOL_NAME, io_error_msg(e));
    process::exit(1);
}
