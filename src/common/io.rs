use std::fs::{self, File};
use std::io::{self, Read, StdinLock};
use std::path::Path;

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

/// Track whether O_NOATIME is supported to avoid repeated failed open() attempts.
/// After the first EPERM, we never try O_NOATIME again.
#[cfg(target_os = "linux")]
static NOATIME_SUPPORTED: AtomicBool = AtomicBool::new(true);

/// Open a file with O_NOATIME on Linux to avoid atime inode writes.
#[cfg(target_os = "linux")]
fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    if NOATIME_SUPPORTED.load(Ordering::Relaxed) {
        match fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOATIME)
            .open(path)
        {
            Ok(f) => return Ok(f),
            Err(ref e) if e.raw_os_error() == Some(libc::EPERM) => {
                // O_NOATIME requires file ownership or CAP_FOWNER
                NOATIME_SUPPORTED.store(false, Ordering::Relaxed);
            }
            Err(e) => return Err(e),
        }
    }
    File::open(path)
}

#[cfg(not(target_os = "linux"))]
fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// A readable input stream: a named file or locked standard input.
pub enum Input {
    Stdin(StdinLock<'static>),
    File(File),
}

impl Read for Input {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Stdin(s) => s.read(buf),
            Input::File(f) => f.read(buf),
        }
    }
}

/// Open `name` for streaming reads. `-` means standard input.
/// Directories are rejected up front so the error names the path, not a read.
pub fn open_input(name: &str) -> io::Result<Input> {
    if name == "-" {
        return Ok(Input::Stdin(io::stdin().lock()));
    }
    let file = open_noatime(Path::new(name))?;
    if file.metadata()?.is_dir() {
        return Err(io::Error::from_raw_os_error(libc::EISDIR));
    }
    Ok(Input::File(file))
}

/// Enlarge pipe buffers on Linux for higher throughput.
/// Larger pipes mean fewer, bigger reads and writes per syscall.
#[cfg(target_os = "linux")]
pub fn enlarge_pipes() {
    for &fd in &[0i32, 1] {
        for &size in &[8 * 1024 * 1024i32, 1024 * 1024, 256 * 1024] {
            if unsafe { libc::fcntl(fd, libc::F_SETPIPE_SZ, size) } > 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::common::io_error_msg;

    #[test]
    fn test_open_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.hex");
        std::fs::write(&path, "cafe").unwrap();
        let mut input = open_input(path.to_str().unwrap()).unwrap();
        let mut s = String::new();
        input.read_to_string(&mut s).unwrap();
        assert_eq!(s, "cafe");
    }

    #[test]
    fn test_open_input_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let err = open_input(path.to_str().unwrap()).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!io_error_msg(&err).contains("os error"));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_input(dir.path().to_str().unwrap()).err().unwrap();
        assert_eq!(io_error_msg(&err), "Is a directory");
    }
}
