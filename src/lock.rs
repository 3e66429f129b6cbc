//! Advisory lock on the graph directory.
//!
//! A build replaces the node and edge tables wholesale; only one process may
//! do that at a time. Readers never lock.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

const LOCK_FILE_NAME: &str = "graph.lock";

/// Held for the duration of a graph write, released on drop.
pub struct GraphLock {
    #[allow(dead_code)]
    file: File,
}

impl GraphLock {
    /// Fails with `WouldBlock` when another process is writing the graph.
    pub fn try_acquire(dir: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE_NAME))?;

        Self::try_lock_exclusive(&file)?;

        Ok(GraphLock { file })
    }

    #[cfg(unix)]
    fn try_lock_exclusive(file: &File) -> io::Result<()> {
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK)
        {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "graph is being written by another process",
            ));
        }
        Err(err)
    }

    #[cfg(not(unix))]
    fn try_lock_exclusive(_file: &File) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for GraphLock {
    fn drop(&mut self) {
        unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
    }
}
