//! Binary publication
//!
//! Publishes the launchable entry point by symlinking the script inside the
//! virtual environment into the user binaries directory. Repeated publishes
//! are idempotent; a creation race against another process is resolved by
//! deleting and retrying once.

use std::fs;
use std::path::{Path, PathBuf};

use crate::environment::VirtualEnvironment;
use crate::error::{InstallError, Result};

/// Name of the published entry point
pub const SCRIPT_NAME: &str = "ton-node-control";

/// Publish the symlink and return its path.
pub fn publish(bin_dir: &Path, env: &VirtualEnvironment) -> Result<PathBuf> {
    fs::create_dir_all(bin_dir)?;

    let link = bin_dir.join(SCRIPT_NAME);
    let target = env.executable(SCRIPT_NAME);

    // symlink_metadata so a dangling link still counts as existing
    if link.symlink_metadata().is_ok() {
        fs::remove_file(&link)?;
    }

    match symlink(&target, &link) {
        Ok(()) => Ok(link),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            // Lost a race with a concurrent creation; replace once.
            fs::remove_file(&link)?;
            symlink(&target, &link)?;
            Ok(link)
        }
        Err(err) => Err(InstallError::from(err)),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are only published on unix platforms",
    ))
}
