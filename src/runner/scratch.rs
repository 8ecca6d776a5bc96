//! Collision-safe scratch files for wrapper telemetry.
//!
//! Several coordinator processes may share one scratch directory, so names
//! are claimed with exclusive create rather than checked-then-created.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RunnerError;

/// Naming attempts before the scratch namespace is considered exhausted.
pub const MAX_SCRATCH_ATTEMPTS: u32 = 300;

/// An exclusively created file, removed when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Claims the first free `<dir>/<prefix>_<n>.out` for `n` in `1..=300`.
    pub fn create(dir: &Path, prefix: &str) -> Result<Self, RunnerError> {
        fs::create_dir_all(dir)?;

        let mut last = PathBuf::new();
        for n in 1..=MAX_SCRATCH_ATTEMPTS {
            last = dir.join(format!("{prefix}_{n}.out"));
            match open_exclusive(&last) {
                Ok(()) => {
                    debug!(path = %last.display(), "Claimed scratch file");
                    return Ok(Self { path: last });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(RunnerError::Io(e)),
            }
        }

        Err(RunnerError::ScratchExhausted {
            attempts: MAX_SCRATCH_ATTEMPTS,
            last,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file contents; an unreadable file reads as empty.
    pub fn read_lossy(&self) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!(path = %self.path.display(), "Scratch file unreadable: {}", e);
                String::new()
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                debug!(path = %self.path.display(), "Failed to remove scratch file: {}", e);
            }
        }
    }
}

#[cfg(unix)]
fn open_exclusive(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .map(|_| ())
}

#[cfg(not(unix))]
fn open_exclusive(path: &Path) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_| ())
}
