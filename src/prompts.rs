//! Interactive prompts
//!
//! Two prompts gate an install: an optional offer to install the native
//! build requirements with superuser privileges, and the required proceed
//! confirmation. `--yes` bypasses both (and never captures a credential, so
//! unattended runs cannot hang on a password read).

use inquire::Confirm;

use crate::compiler::BUILD_REQUIREMENTS;
use crate::credential::SudoCredential;
use crate::error::{InstallError, Result};
use crate::process;
use crate::ui;

/// Offer to capture a sudo credential for package installation.
///
/// Returns `None` when running as root (no elevation needed), when the user
/// keeps package installation to themselves, or with `--yes`. Declining
/// this prompt is not an error; only the proceed prompt is required.
pub fn acquire_sudo(accept_all: bool) -> Result<Option<SudoCredential>> {
    if process::is_root() || accept_all {
        return Ok(None);
    }

    ui::warning(
        "The installer is not running with superuser privileges, but installing\n\
         the native build requirements needs them. You can enter your superuser\n\
         password, or install the packages yourself. Packages required:",
    );
    println!("    {} {}", install_hint(), BUILD_REQUIREMENTS.join(" "));

    let use_installer = Confirm::new("Install the required system packages via the installer?")
        .with_default(false)
        .with_help_message("Requires your superuser password")
        .prompt()
        .unwrap_or(false);

    if !use_installer {
        return Ok(None);
    }

    ui::warning("The installer will be used to install the required packages.");
    let password = rpassword::prompt_password("Type your password: ").map_err(InstallError::from)?;
    Ok(Some(SudoCredential::new(password)))
}

/// Required confirmation before any directory is touched.
pub fn confirm_proceed(accept_all: bool) -> Result<()> {
    if accept_all {
        return Ok(());
    }

    ui::warning("Make sure the required packages for the installation are available.");
    let proceed = Confirm::new("Proceed?")
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to cancel")
        .prompt()
        .unwrap_or(false);

    if proceed {
        Ok(())
    } else {
        Err(InstallError::Declined)
    }
}

fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "brew install"
    } else {
        "sudo apt-get install"
    }
}
