//! SIGINT handling
//!
//! The installer is synchronous and blocking, so an interrupt is observed
//! at stage boundaries and after every child process completes. The handler
//! only raises an atomic flag; stage guards roll back on the resulting
//! error path. `SA_RESTART` keeps blocking network reads intact while the
//! flag is pending.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{InstallError, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_sigint(_signum: i32) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler. Child processes spawned afterwards get the
/// default disposition back, so Ctrl-C still terminates them; the runner
/// then surfaces `Interrupted` instead of a plain process failure.
#[cfg(unix)]
pub fn install_handler() {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic flag.
    unsafe {
        let _ = sigaction(Signal::SIGINT, &action);
    }
}

#[cfg(not(unix))]
pub fn install_handler() {}

/// Whether a SIGINT has been observed since startup.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Error out if an interrupt is pending. Called between stages and after
/// child processes exit.
pub fn check() -> Result<()> {
    if interrupted() {
        Err(InstallError::Interrupted)
    } else {
        Ok(())
    }
}
