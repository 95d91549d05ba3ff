//! Pseudo-terminal pair standing in for the serial port.
//!
//! Clients open the slave path as if it were the real device; the relay reads
//! and writes the master side. The slave descriptor is held for the whole
//! session so that the master never sees a hangup when a client disconnects
//! and reconnects.
//!
//! The master is non-blocking. A client that stops reading fills the kernel
//! buffer, and the relay must still be able to notice cancellation.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::{Path, PathBuf};

use log::debug;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::pty::{openpty, OpenptyResult, Winsize};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};
use nix::unistd::ttyname;

use crate::error_handling::types::EndpointError;

#[derive(Debug)]
pub struct VirtualEndpoint {
    master: File,
    slave: OwnedFd,
    path: PathBuf,
}

impl VirtualEndpoint {
    /// Allocates a new pseudo-terminal pair with the slave in raw mode.
    pub fn open() -> Result<Self, EndpointError> {
        let OpenptyResult { master, slave } =
            openpty(None::<&Winsize>, None::<&Termios>).map_err(EndpointError::AllocationFailed)?;

        // No echo, no CR/LF rewriting: the relay must stay byte-transparent.
        let mut termios = tcgetattr(&slave).map_err(EndpointError::TermiosError)?;
        cfmakeraw(&mut termios);
        tcsetattr(&slave, SetArg::TCSANOW, &termios).map_err(EndpointError::TermiosError)?;

        let flags = fcntl(&master, FcntlArg::F_GETFL).map_err(EndpointError::TermiosError)?;
        let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
        fcntl(&master, FcntlArg::F_SETFL(flags)).map_err(EndpointError::TermiosError)?;

        let path = ttyname(&slave).map_err(EndpointError::PathUnavailable)?;
        debug!("allocated pseudo-terminal {}", path.display());

        Ok(Self {
            master: File::from(master),
            slave,
            path,
        })
    }

    /// Path external clients connect to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Independent handles on the master side, one for each pump. Both share
    /// the non-blocking mode.
    pub fn master_handles(&self) -> Result<(File, File), EndpointError> {
        let reader = self.master.try_clone()?;
        let writer = self.master.try_clone()?;
        Ok((reader, writer))
    }

    /// Opens the slave path the way a client would.
    pub fn connect_client(&self) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(&self.path)
    }

    pub fn slave_fd(&self) -> BorrowedFd<'_> {
        self.slave.as_fd()
    }
}

/// Waits up to `timeout_ms` for `fd` to become readable.
///
/// Hangup and error conditions also count as ready so that the following
/// read reports them. An interrupted wait is reported as not ready.
pub fn wait_readable(fd: BorrowedFd<'_>, timeout_ms: u16) -> Result<bool, Errno> {
    wait_for(fd, PollFlags::POLLIN, timeout_ms)
}

/// Write-side counterpart of [`wait_readable`].
pub fn wait_writable(fd: BorrowedFd<'_>, timeout_ms: u16) -> Result<bool, Errno> {
    wait_for(fd, PollFlags::POLLOUT, timeout_ms)
}

fn wait_for(fd: BorrowedFd<'_>, events: PollFlags, timeout_ms: u16) -> Result<bool, Errno> {
    let mut fds = [PollFd::new(fd, events)];
    match poll(&mut fds, PollTimeout::from(timeout_ms)) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(Errno::EINTR) => Ok(false),
        Err(e) => Err(e),
    }
}
