//! Atomic replacement of output files.
//!
//! Workbooks are written to a temp file next to the destination, flushed and synced, then
//! renamed over the destination. A failed write never truncates or half-writes an existing
//! output, and the temp file is removed on every error path.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Failure of an atomic write: either the filesystem plumbing or the caller's writer.
#[derive(Debug)]
pub enum AtomicWriteError<E> {
    Io(io::Error),
    Writer(E),
}

impl<E> From<io::Error> for AtomicWriteError<E> {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for AtomicWriteError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicWriteError::Io(err) => write!(f, "io error: {err}"),
            AtomicWriteError::Writer(err) => write!(f, "{err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for AtomicWriteError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtomicWriteError::Io(err) => Some(err),
            AtomicWriteError::Writer(err) => Some(err),
        }
    }
}

/// Directory that will hold the temp file for `path`.
///
/// `Path::parent` is `Some("")` for bare file names like `art.xlsx`; that means the current
/// directory.
fn parent_dir_or_dot(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Write `dest` atomically.
///
/// Parent directories are created if missing. `write_fn` receives the open temp file; if it
/// fails, `dest` is left untouched and the temp file is deleted.
pub fn atomic_write<T, E>(
    dest: impl AsRef<Path>,
    write_fn: impl FnOnce(&mut File) -> Result<T, E>,
) -> Result<T, AtomicWriteError<E>> {
    let dest = dest.as_ref();
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    let out = write_fn(tmp.as_file_mut()).map_err(AtomicWriteError::Writer)?;

    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    let tmp_path = tmp.into_temp_path();
    replace_file(tmp_path.as_ref(), dest)?;

    // Best effort: the file is already in place.
    let _ = sync_parent_dir(dest);

    Ok(out)
}

/// [`atomic_write`] for a complete in-memory buffer.
pub fn atomic_write_bytes(dest: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write(dest, |file| file.write_all(bytes)).map_err(|err| match err {
        AtomicWriteError::Io(err) | AtomicWriteError::Writer(err) => err,
    })
}

fn sync_parent_dir(path: &Path) -> io::Result<()> {
    // Opening a directory as a file works on most Unix platforms; elsewhere this is skipped.
    File::open(parent_dir_or_dot(path))?.sync_all()
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt as _;
        use windows_sys::Win32::Storage::FileSystem::{MoveFileExW, MOVEFILE_REPLACE_EXISTING};

        fn to_wide_null(path: &Path) -> Vec<u16> {
            path.as_os_str().encode_wide().chain(Some(0)).collect()
        }

        let from_w = to_wide_null(from);
        let to_w = to_wide_null(to);
        let ok = unsafe { MoveFileExW(from_w.as_ptr(), to_w.as_ptr(), MOVEFILE_REPLACE_EXISTING) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
