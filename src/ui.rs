//! Console output helpers
//!
//! Colorized per-stage status lines and the in-place "Installing …" step
//! line. All user-visible decoration lives here; the stage and metadata
//! modules never print.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

pub fn info(message: &str) {
    println!("{}", Style::new().cyan().apply_to(message));
}

pub fn comment(message: &str) {
    println!("{}", Style::new().dim().apply_to(message));
}

pub fn success(message: &str) {
    println!("{}", Style::new().green().apply_to(message));
}

pub fn warning(message: &str) {
    println!("{}", Style::new().yellow().apply_to(message));
}

pub fn error(message: &str) {
    eprintln!("{}", Style::new().red().apply_to(message));
}

/// Welcome banner shown once the target versions are resolved
pub fn pre_message(bin_dir: &std::path::Path) {
    println!(
        "Welcome to {}!\n\n\
         This will download and install the latest version of {},\n\
         a tool to control and operate a TON validator node.\n\n\
         It will add the `ton-node-control` command to the binaries directory, located at:\n\n\
         {}\n\n\
         You can uninstall at any time by running this installer with the `--uninstall`\n\
         option, and these changes will be reverted.",
        Style::new().cyan().apply_to("ton-node-control"),
        Style::new().cyan().apply_to("ton-node-control"),
        Style::new().dim().apply_to(bin_dir.display()),
    );
}

/// In-place progress line for one installation, updated per step
pub struct InstallProgress {
    bar: ProgressBar,
    version: String,
}

impl InstallProgress {
    pub fn new(version: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            bar,
            version: version.to_string(),
        }
    }

    /// Replace the current step message.
    pub fn step(&self, message: &str) {
        self.bar.set_message(format!(
            "Installing {} ({}): {}",
            Style::new().cyan().apply_to("ton-node-control"),
            Style::new().bold().apply_to(&self.version),
            Style::new().dim().apply_to(message),
        ));
    }

    /// Clear the line; the caller prints the final banner.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for InstallProgress {
    fn drop(&mut self) {
        // Leave no half-drawn spinner behind on error paths.
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
