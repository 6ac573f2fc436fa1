//! Native build stage
//!
//! Compiles the ton-blockchain sources at the pinned revision. The sources
//! land in a scratch directory (tarball snapshot by default, git clone with
//! `--git`); the configure and build steps run against the staged build
//! directory. The compiler carries its toolchain environment (CC/CXX,
//! ccache disabled) and applies it per command; nothing mutates the
//! process environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;

use crate::credential::SudoCredential;
use crate::error::{InstallError, Result};
use crate::git;
use crate::metadata::{self, MetadataClient};
use crate::process;

/// Canonical node source repository, cloned when `--git` is given
pub const NODE_REPO_URL: &str = "https://github.com/ton-blockchain/ton.git";

/// Native packages required to build the node sources
pub const BUILD_REQUIREMENTS: &[&str] = &[
    "build-essential",
    "git",
    "make",
    "cmake",
    "clang",
    "libgflags-dev",
    "zlib1g-dev",
    "libssl-dev",
    "libreadline-dev",
    "libmicrohttpd-dev",
    "pkg-config",
    "libgsl-dev",
    "python3",
    "python3-dev",
    "python3-pip",
];

/// Build targets compiled out of the node source tree
pub const BUILD_TARGETS: &[&str] = &[
    "dht-server",
    "fift",
    "func",
    "lite-client",
    "validator-engine",
    "validator-engine-console",
    "generate-random-id",
    "tonlibjson",
    "rldp-http-proxy",
];

/// Handle over the staged node build directory
pub struct Compiler {
    build_dir: PathBuf,
    build_env: Vec<(String, String)>,
}

impl Compiler {
    /// Set up the build directory and, when elevation is available, the
    /// native build requirements.
    pub fn prepare(build_dir: &Path, credential: Option<&SudoCredential>) -> Result<Self> {
        fs::create_dir_all(build_dir)?;

        let compiler = Self {
            build_dir: build_dir.to_path_buf(),
            build_env: toolchain_env(),
        };

        if credential.is_some() || process::is_root() {
            compiler.install_requirements(credential)?;
        }

        Ok(compiler)
    }

    /// Fetch the sources for `revision` into the scratch directory and
    /// return the source tree root.
    pub fn fetch_sources(
        &self,
        client: &MetadataClient,
        revision: &str,
        git_url: Option<&str>,
        scratch: &Path,
    ) -> Result<PathBuf> {
        match git_url {
            Some(url) => {
                let dest = scratch.join("ton");
                let repo = git::clone(url, &dest)?;
                git::reset_hard(&repo, revision)?;
                git::update_submodules(&repo)?;
                Ok(dest)
            }
            None => {
                let bytes = client.download(&metadata::tarball_url(revision))?;
                unpack_tarball(&bytes, scratch)
            }
        }
    }

    /// Run the configure step with the fixed release build type.
    pub fn configure(&self, sources: &Path) -> Result<()> {
        process::run(
            Command::new("cmake")
                .arg("-DCMAKE_BUILD_TYPE=Release")
                .arg("-S")
                .arg(sources)
                .arg("-B")
                .arg(&self.build_dir)
                .envs(self.build_env.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        )?;
        Ok(())
    }

    /// Run the parallel build against the pinned target list.
    pub fn build(&self) -> Result<()> {
        let jobs = num_cpus::get().to_string();
        process::run(
            Command::new("make")
                .current_dir(&self.build_dir)
                .arg("-j")
                .arg(jobs)
                .args(BUILD_TARGETS)
                .envs(self.build_env.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        )?;
        Ok(())
    }

    fn install_requirements(&self, credential: Option<&SudoCredential>) -> Result<()> {
        if cfg!(target_os = "macos") {
            // brew refuses to run under sudo; it elevates itself as needed.
            process::run(Command::new("brew").arg("update"))?;
            for requirement in missing_requirements() {
                process::run(Command::new("brew").args(["install", requirement]))?;
            }
            return Ok(());
        }

        process::run_elevated(credential, "apt-get", &["update", "-y"])?;
        for requirement in missing_requirements() {
            process::run_elevated(credential, "apt-get", &["install", "-y", requirement])?;
        }
        Ok(())
    }
}

/// Requirements without a matching executable on PATH. Library packages
/// never resolve to a binary, so they are (re-)installed every time; the
/// package manager treats that as a no-op.
fn missing_requirements() -> impl Iterator<Item = &'static str> {
    BUILD_REQUIREMENTS
        .iter()
        .copied()
        .filter(|requirement| which::which(requirement).is_err())
}

fn toolchain_env() -> Vec<(String, String)> {
    let mut env = vec![("CCACHE_DISABLE".to_string(), "1".to_string())];
    if let Ok(cc) = which::which("clang") {
        env.push(("CC".to_string(), cc.display().to_string()));
    }
    if let Ok(cxx) = which::which("clang++") {
        env.push(("CXX".to_string(), cxx.display().to_string()));
    }
    env
}

/// Unpack a gzipped source tarball and return its single top-level
/// directory (forge tarballs nest everything under `<repo>-<sha>/`).
pub fn unpack_tarball(bytes: &[u8], dest: &Path) -> Result<PathBuf> {
    let decoder = GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest).map_err(|e| InstallError::Archive {
        reason: e.to_string(),
    })?;

    fs::read_dir(dest)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.is_dir())
        .ok_or_else(|| InstallError::Archive {
            reason: "archive contained no source directory".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use tempfile::TempDir;

    fn sample_tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

        let content = b"project(ton)";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                "ton-blockchain-ton-1e3bd1d/CMakeLists.txt",
                &content[..],
            )
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_unpack_tarball_returns_top_level_dir() {
        let temp = TempDir::new().unwrap();
        let sources = unpack_tarball(&sample_tarball(), temp.path()).unwrap();
        assert!(sources.ends_with("ton-blockchain-ton-1e3bd1d"));
        assert!(sources.join("CMakeLists.txt").exists());
    }

    #[test]
    fn test_unpack_garbage_fails() {
        let temp = TempDir::new().unwrap();
        let err = unpack_tarball(b"not a tarball", temp.path()).unwrap_err();
        assert!(matches!(err, InstallError::Archive { .. }));
    }

    #[test]
    fn test_build_targets_cover_the_node_toolset() {
        for target in [
            "validator-engine",
            "validator-engine-console",
            "dht-server",
            "generate-random-id",
            "tonlibjson",
            "rldp-http-proxy",
        ] {
            assert!(BUILD_TARGETS.contains(&target), "{target} missing");
        }
    }

    #[test]
    fn test_toolchain_env_always_disables_ccache() {
        let env = toolchain_env();
        assert!(
            env.iter()
                .any(|(k, v)| k == "CCACHE_DISABLE" && v == "1")
        );
    }
}
