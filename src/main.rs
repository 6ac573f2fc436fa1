//! tnc-install - bootstrap installer for ton-node-control
//!
//! Installs ton-node-control into its own virtual environment, compiles the
//! TON node binaries from source and links the control script into a
//! directory on `PATH`. Designed to be piped from curl, so everything either
//! completes or rolls back to the previous state.

use chrono::Utc;
use clap::Parser;

mod cli;
mod compiler;
mod config;
mod credential;
mod environment;
mod error;
mod git;
mod installer;
mod linker;
mod metadata;
mod paths;
mod process;
mod prompts;
mod signal;
mod stage;
mod ui;
mod version;

use cli::Cli;
use config::InstallerConfig;
use error::InstallError;
use installer::Installer;

fn main() {
    if cfg!(windows) {
        ui::error("ton-node-control is not supported on Windows.");
        std::process::exit(1);
    }

    let cli = Cli::parse();
    signal::install_handler();

    let config = InstallerConfig::from_cli(&cli);
    let uninstall = cli.uninstall;

    let outcome = Installer::new(config).and_then(|installer| {
        if uninstall {
            installer.uninstall()
        } else {
            installer.run()
        }
    });

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            report(&error);
            std::process::exit(error.exit_code());
        }
    }
}

/// Print the failure and, for command failures, dump the captured output to
/// a log file next to the invocation so the user can attach it to a report.
fn report(error: &InstallError) {
    ui::error(&format!("{error}"));

    if let Some(log) = error.process_log() {
        let name = format!("tnc-install-error-{}.log", Utc::now().format("%Y%m%d%H%M%S"));
        match std::fs::write(&name, log) {
            Ok(()) => ui::comment(&format!("See {name} for error logs.")),
            Err(_) => eprintln!("{log}"),
        }
    }
}
