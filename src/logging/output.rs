// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output descriptor the drain worker writes to

use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

/// The single descriptor a [`Log`](super::Log) drains into
#[derive(Debug, Default)]
pub enum LogOutput {
    /// Process standard error (the default)
    #[default]
    Stderr,
    /// Process standard output
    Stdout,
    /// An owned descriptor: file, pipe, socket
    Fd(OwnedFd),
}

impl LogOutput {
    pub fn file(file: File) -> Self {
        LogOutput::Fd(file.into())
    }

    /// One `write(2)` call; no retry here
    pub(crate) fn write(&self, buf: &[u8]) -> nix::Result<usize> {
        match self {
            LogOutput::Stderr => nix::unistd::write(std::io::stderr(), buf),
            LogOutput::Stdout => nix::unistd::write(std::io::stdout(), buf),
            LogOutput::Fd(fd) => nix::unistd::write(fd, buf),
        }
    }

    pub fn raw_fd(&self) -> RawFd {
        match self {
            LogOutput::Stderr => std::io::stderr().as_raw_fd(),
            LogOutput::Stdout => std::io::stdout().as_raw_fd(),
            LogOutput::Fd(fd) => fd.as_raw_fd(),
        }
    }
}

impl From<File> for LogOutput {
    fn from(file: File) -> Self {
        LogOutput::file(file)
    }
}

impl From<OwnedFd> for LogOutput {
    fn from(fd: OwnedFd) -> Self {
        LogOutput::Fd(fd)
    }
}
