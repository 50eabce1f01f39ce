use std::{
    fs::{File, OpenOptions},
    io::Write,
    os::fd::AsRawFd,
    path::Path,
};

use nix::fcntl;

pub struct FileGuard {
    file: File,
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        _ = fcntl::flock(self.file.as_raw_fd(), nix::fcntl::FlockArg::Unlock);
    }
}

pub fn flock(path: &Path) -> std::io::Result<FileGuard> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    fcntl::flock(
        file.as_raw_fd(),
        nix::fcntl::FlockArg::LockExclusiveNonblock,
    )?;
    // Leave the owning pid behind for diagnosis of stale locks
    _ = writeln!(file, "{}", std::process::id());
    Ok(FileGuard { file })
}
