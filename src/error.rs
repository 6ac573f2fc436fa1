//! Error types and handling for the installer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallError {
    // Validation errors: reported before any directory is touched
    #[error("Version {version} does not exist")]
    #[diagnostic(
        code(tnc::metadata::version_not_found),
        help("Check the published releases, or pass --preview to allow pre-releases")
    )]
    VersionNotFound { version: String },

    #[error("Revision {revision} does not exist")]
    #[diagnostic(
        code(tnc::metadata::revision_not_found),
        help("Pass a full 40-character commit sha from the ton-blockchain history")
    )]
    RevisionNotFound { revision: String },

    // Network errors
    #[error("Failed to fetch {url}: {reason}")]
    #[diagnostic(code(tnc::metadata::fetch_failed))]
    MetadataFetch { url: String, reason: String },

    #[error("Failed to parse release metadata: {reason}")]
    #[diagnostic(code(tnc::metadata::parse_failed))]
    MetadataParse { reason: String },

    // External process errors
    #[error("{program} exited with status {code}")]
    #[diagnostic(
        code(tnc::process::failed),
        help("The combined output of the failed command is written to a log file")
    )]
    Process {
        program: String,
        code: i32,
        log: String,
    },

    #[error("Could not find {program} on PATH")]
    #[diagnostic(
        code(tnc::process::missing_tool),
        help("Install the tool or make sure it is reachable from PATH")
    )]
    MissingTool { program: String },

    // Git errors
    #[error("Failed to clone {url}: {reason}")]
    #[diagnostic(
        code(tnc::git::clone_failed),
        help("Check that the URL is correct and you have access to the repository")
    )]
    GitClone { url: String, reason: String },

    #[error("Failed to reset to revision '{revision}': {reason}")]
    #[diagnostic(code(tnc::git::reset_failed))]
    GitReset { revision: String, reason: String },

    #[error("Failed to fetch submodule '{name}': {reason}")]
    #[diagnostic(code(tnc::git::submodule_failed))]
    GitSubmodule { name: String, reason: String },

    // Source archive errors
    #[error("Failed to unpack source archive: {reason}")]
    #[diagnostic(code(tnc::sources::unpack_failed))]
    Archive { reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(tnc::fs::io_error))]
    Io { message: String },

    #[error("Interrupted")]
    #[diagnostic(
        code(tnc::interrupted),
        help("The stage in progress was rolled back; re-run the installer to retry")
    )]
    Interrupted,

    #[error("Installation process stopped")]
    #[diagnostic(code(tnc::declined))]
    Declined,
}

impl InstallError {
    /// Process exit code for this failure.
    ///
    /// `0` is reserved for success and "already up to date"; a declined
    /// required prompt exits `13`; everything else is a generic `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::Declined => 13,
            _ => 1,
        }
    }

    /// Captured child-process output, when this failure carries one.
    pub fn process_log(&self) -> Option<&str> {
        match self {
            InstallError::Process { log, .. } => Some(log.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InstallError {
    fn from(err: std::io::Error) -> Self {
        InstallError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for InstallError {
    fn from(err: serde_json::Error) -> Self {
        InstallError::MetadataParse {
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for InstallError {
    fn from(err: reqwest::Error) -> Self {
        InstallError::MetadataFetch {
            url: err
                .url()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown".to_string()),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstallError>;
