//! CLI definitions using clap derive API
//!
//! The binary is the install command itself (like the shell one-liner it is
//! piped from), so everything is a flag rather than a subcommand. Clap's own
//! `--version` flag is disabled: `--version` selects the tool version to
//! install, as the original install scripts have always done.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

/// tnc-install - bootstrap installer for ton-node-control
#[derive(Parser, Debug)]
#[command(
    name = "tnc-install",
    author,
    disable_version_flag = true,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Installs the latest (or given) version of ton-node-control",
    long_about = "tnc-install provisions a virtual environment for ton-node-control, \
                  compiles the ton-blockchain node sources at a pinned revision and \
                  links the ton-node-control executable into your binaries directory.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  tnc-install\n    \
                  tnc-install --version 2.3.0\n    \
                  tnc-install --node-version 1e3bd1d0a21a8f4b4d88a6d078e79cb1f5f0ce4b\n    \
                  tnc-install --git https://github.com/ton-blockchain/ton.git --yes\n    \
                  tnc-install --uninstall\n\n\
                  \x1b[1m\x1b[32mEnvironment:\x1b[0m\n    \
                  TON_NODE_CONTROL_HOME  redirects the module, binaries and build directories"
)]
pub struct Cli {
    /// Install a specific ton-node-control version instead of the latest release
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Build a specific ton-blockchain commit instead of the most recent one
    #[arg(long, value_name = "SHA")]
    pub node_version: Option<String>,

    /// Build the node sources from a git clone instead of the release tarball,
    /// optionally overriding the repository URL
    #[arg(
        long,
        value_name = "URL",
        num_args = 0..=1,
        default_missing_value = crate::compiler::NODE_REPO_URL
    )]
    pub git: Option<String>,

    /// Accept all prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Install on top of an existing version
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Allow pre-release versions when picking the latest release
    #[arg(long)]
    pub preview: bool,

    /// Uninstall ton-node-control
    #[arg(long)]
    pub uninstall: bool,
}
