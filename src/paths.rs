//! Directory resolution
//!
//! Computes the three filesystem locations the installer works with: the
//! module directory (virtual environment + version marker), the user
//! binaries directory (published symlink) and the node build directory
//! (compiled ton-blockchain tree + its own marker). A
//! `TON_NODE_CONTROL_HOME` override redirects all three; otherwise the
//! platform convention applies (Application Support on macOS, XDG data dirs
//! elsewhere).
//!
//! Resolution is a pure function of the override value: no directory is
//! created or checked here.

use std::path::{Path, PathBuf};

/// Directory name under the platform data dir
const MODULE_DIR: &str = "ton-node-control";

/// Subdirectory of the module dir holding the virtual environment
const VENV_DIR: &str = "venv";

/// Subdirectory of the module dir holding the compiled node tree.
/// Kept distinct from the module root so the two VERSION markers can
/// never resolve to the same file, whatever the layout.
const NODE_DIR: &str = "node";

/// Plain-text marker file recording an installed version
pub const VERSION_FILE: &str = "VERSION";

/// Resolved filesystem layout for one installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Root directory holding the virtual environment and version marker
    pub module_dir: PathBuf,
    /// Directory the launchable symlink is published into
    pub bin_dir: PathBuf,
    /// Directory holding the ton-blockchain build tree
    pub node_build_dir: PathBuf,
}

impl Directories {
    /// Resolve all directories from an optional home override.
    ///
    /// Always returns a value, even if none of the paths exist yet.
    pub fn resolve(home_override: Option<&Path>) -> Self {
        if let Some(home) = home_override {
            return Self {
                module_dir: home.to_path_buf(),
                bin_dir: home.join("bin"),
                node_build_dir: home.join(NODE_DIR),
            };
        }

        let module_dir = dirs::data_dir()
            .unwrap_or_else(|| fallback_home().join(".local/share"))
            .join(MODULE_DIR);
        let bin_dir = dirs::executable_dir().unwrap_or_else(|| fallback_home().join(".local/bin"));
        let node_build_dir = module_dir.join(NODE_DIR);

        Self {
            module_dir,
            bin_dir,
            node_build_dir,
        }
    }

    /// Virtual environment slot inside the module directory
    pub fn venv_path(&self) -> PathBuf {
        self.module_dir.join(VENV_DIR)
    }

    /// Marker file recording the installed ton-node-control version
    pub fn version_file(&self) -> PathBuf {
        self.module_dir.join(VERSION_FILE)
    }

    /// Marker file recording the built ton-blockchain revision
    pub fn node_version_file(&self) -> PathBuf {
        self.node_build_dir.join(VERSION_FILE)
    }
}

fn fallback_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}
