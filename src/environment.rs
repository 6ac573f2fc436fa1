//! Virtual environment handling
//!
//! Creates the isolated Python environment ton-node-control is installed
//! into. The platform `venv` module is preferred; on distributions that
//! ship Python without `ensurepip` the portable `virtualenv.pyz` bootstrap
//! is downloaded and run instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{InstallError, Result};
use crate::metadata::MetadataClient;
use crate::process;

/// Marker file identifying the environment as installer-managed
const ENV_MARKER: &str = "tnc_env";

const BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/virtualenv";

/// Handle to a created virtual environment
#[derive(Debug, Clone)]
pub struct VirtualEnvironment {
    path: PathBuf,
    bin_path: PathBuf,
}

impl VirtualEnvironment {
    /// Wrap an existing environment directory.
    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            bin_path: path.join("bin"),
        }
    }

    /// Construct a fresh environment at `target`, upgrade its pip and
    /// return the handle.
    pub fn make(client: &MetadataClient, target: &Path) -> Result<Self> {
        let python = find_python()?;

        let created = process::run(
            Command::new(&python)
                .args(["-m", "venv", "--clear"])
                .arg(target),
        );
        match created {
            Ok(_) => {}
            // venv without ensurepip fails at pip seeding; fall back to the
            // portable bootstrap package.
            Err(InstallError::Process { .. }) => bootstrap_environment(client, &python, target)?,
            Err(err) => return Err(err),
        }

        fs::write(target.join(ENV_MARKER), "")?;

        let env = Self::at(target);
        env.pip(&["install", "--disable-pip-version-check", "--upgrade", "pip"])?;
        Ok(env)
    }

    /// Run the environment's interpreter.
    pub fn python(&self, args: &[&str]) -> Result<String> {
        process::run(Command::new(self.bin_path.join("python")).args(args))
    }

    /// Run the environment's pip.
    pub fn pip(&self, args: &[&str]) -> Result<String> {
        let mut full: Vec<&str> = vec!["-m", "pip"];
        full.extend_from_slice(args);
        self.python(&full)
    }

    /// Install the pinned ton-node-control release into this environment.
    pub fn install_tool(&self, version: &str) -> Result<()> {
        let spec = tool_spec(version);
        self.pip(&["install", &spec])?;
        Ok(())
    }

    /// Path of an entry-point script inside the environment.
    pub fn executable(&self, name: &str) -> PathBuf {
        self.bin_path.join(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// pip requirement specifier pinning the tool to one registry release
pub fn tool_spec(version: &str) -> String {
    format!("ton-node-control=={version}")
}

fn find_python() -> Result<PathBuf> {
    which::which("python3")
        .or_else(|_| which::which("python"))
        .map_err(|_| InstallError::MissingTool {
            program: "python3".to_string(),
        })
}

/// Download `virtualenv.pyz` matching the host interpreter and run it.
fn bootstrap_environment(client: &MetadataClient, python: &Path, target: &Path) -> Result<()> {
    let version = interpreter_version(python)?;
    let url = format!("{BOOTSTRAP_URL}/{version}/virtualenv.pyz");
    let bytes = client.download(&url)?;

    let scratch = tempfile::Builder::new().prefix("tnc-installer").tempdir()?;
    let pyz = scratch.path().join("virtualenv.pyz");
    fs::write(&pyz, bytes)?;

    process::run(
        Command::new(python)
            .arg(&pyz)
            .args(["--clear", "--always-copy"])
            .arg(target),
    )?;
    Ok(())
}

fn interpreter_version(python: &Path) -> Result<String> {
    let out = process::run(Command::new(python).args([
        "-c",
        "import sys; print(f'{sys.version_info.major}.{sys.version_info.minor}')",
    ]))?;
    Ok(out.trim().to_string())
}
