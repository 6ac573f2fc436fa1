//! Installer configuration
//!
//! One `InstallerConfig` value is built in `main` from the parsed CLI flags
//! and the `TON_NODE_CONTROL_HOME` environment variable, then passed
//! explicitly into the components that need it. Nothing reads the
//! environment after this point.

use std::path::PathBuf;

use crate::cli::Cli;

/// Environment variable redirecting all resolved directories
pub const HOME_ENV_VAR: &str = "TON_NODE_CONTROL_HOME";

/// Immutable run configuration, resolved once at process start
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Explicit home-directory override, highest priority for path resolution
    pub home_override: Option<PathBuf>,
    /// Explicit ton-node-control version to install
    pub version: Option<String>,
    /// Explicit ton-blockchain commit to build
    pub node_version: Option<String>,
    /// Build the node sources from a git clone of this repository
    pub git: Option<String>,
    /// Accept all prompts
    pub accept_all: bool,
    /// Install on top of an existing version
    pub force: bool,
    /// Allow pre-release versions when picking the latest release
    pub preview: bool,
}

impl InstallerConfig {
    /// Build the configuration from CLI flags and the process environment.
    pub fn from_cli(cli: &Cli) -> Self {
        let home_override = std::env::var_os(HOME_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            home_override,
            version: cli.version.clone(),
            node_version: cli.node_version.clone(),
            git: cli.git.clone(),
            accept_all: cli.yes,
            force: cli.force,
            preview: cli.preview,
        }
    }
}
