//! External command spawning (§6: "an external command helper is used to
//! spawn external commands; the child closes the X connection fd, starts a
//! new session, restores `SIGCHLD` to default").
use std::os::unix::process::CommandExt;
use std::os::unix::io::RawFd;
use std::process::{Command, Stdio};

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, Pid};
use tracing::warn;

use crate::Result;

/// Run an external command, redirecting its stdout/stderr to `/dev/null`
/// (dwm's `spawn()`, via the reference architecture's `util::spawn`).
///
/// `x_fd` is the raw file descriptor of the manager's own X connection, if
/// the active [`crate::x::XConn`] backend exposes one; the child closes it
/// before `exec` so the spawned program does not inherit our connection.
pub fn spawn(prog: &str, args: &[&str], x_fd: Option<RawFd>) -> Result<()> {
    let mut cmd = Command::new(prog);
    cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());

    // SAFETY: only async-signal-safe calls between fork and exec.
    unsafe {
        cmd.pre_exec(move || {
            if let Some(fd) = x_fd {
                let _ = unistd::close(fd);
            }
            let _ = unistd::setsid();
            let _ = signal::signal(Signal::SIGCHLD, SigHandler::SigDfl);
            Ok(())
        });
    }

    match cmd.spawn() {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(%prog, %e, "failed to spawn external program");
            Ok(())
        }
    }
}

/// Reap any children inherited at startup, then ignore `SIGCHLD` so future
/// [`spawn`]ed children are reaped automatically without us waiting on them
/// (§5: "SIGCHLD is ignored at startup; any inherited zombies are reaped
/// once at startup").
pub fn reap_existing_children_and_ignore_sigchld() {
    loop {
        match unistd::waitpid(Pid::from_raw(-1), Some(nix::sys::wait::WaitPidFlag::WNOHANG)) {
            Ok(nix::sys::wait::WaitStatus::StillAlive) | Err(_) => break,
            Ok(nix::sys::wait::WaitStatus::Exited(..)) | Ok(nix::sys::wait::WaitStatus::Signaled(..)) => continue,
            _ => break,
        }
    }

    // SAFETY: installing a signal disposition, no other preconditions.
    unsafe {
        let _ = signal::signal(Signal::SIGCHLD, SigHandler::SigIgn);
    }
}

/// Interval between clock refreshes for [`start_clock`].
const CLOCK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Drive the bar's status clock (`config::StatusSource::Clock`) from a
/// detached background thread: once a second, set the root window's
/// `WM_NAME` to the current time via `xsetroot`, exactly the way any other
/// status-setting program would. The main loop's existing `PropertyNotify`
/// handling on `WM_NAME` then picks the new text up like any other status
/// update, so nothing in the event loop itself needs to know about clocks.
pub fn start_clock(x_fd: Option<RawFd>) {
    std::thread::spawn(move || loop {
        let now = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
        let _ = spawn("xsetroot", &["-name", &now], x_fd);
        std::thread::sleep(CLOCK_INTERVAL);
    });
}
