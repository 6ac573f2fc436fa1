//! Install orchestration
//!
//! Sequences the whole install: resolve target versions, confirm, ensure
//! directories, build the environment, compile the node sources, link the
//! binary and persist the version markers. Every stage fully completes
//! (success or rollback) before the next begins; a stage failure maps to a
//! non-zero process exit in `main`.

use std::fs;

use console::Style;

use crate::compiler::Compiler;
use crate::config::InstallerConfig;
use crate::credential::SudoCredential;
use crate::environment::VirtualEnvironment;
use crate::error::Result;
use crate::linker;
use crate::metadata::{self, MetadataClient, Resolution};
use crate::paths::Directories;
use crate::prompts;
use crate::signal;
use crate::stage::StagedDir;
use crate::ui;

/// Backup suffix for the environment slot
const ENV_SUFFIX: &str = "save";

/// Backup suffix for the node build slot
const BUILD_SUFFIX: &str = "backup";

pub struct Installer {
    config: InstallerConfig,
    dirs: Directories,
    client: MetadataClient,
}

impl Installer {
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let dirs = Directories::resolve(config.home_override.as_deref());
        let client = MetadataClient::new()?;
        Ok(Self {
            config,
            dirs,
            client,
        })
    }

    /// Run the full install. Returns the process exit code on the
    /// non-error paths (`0` covers "already up to date").
    pub fn run(&self) -> Result<i32> {
        // ResolveVersions
        ui::info("Retrieving ton-node-control meta-data");
        let tool = self.client.resolve_tool_version(
            &self.dirs,
            self.config.version.as_deref(),
            self.config.preview,
            self.config.force,
        )?;
        let Some(version) = tool.target.clone() else {
            if let Some(current) = &tool.current {
                println!(
                    "The latest version ({}) is already installed.",
                    Style::new().bold().apply_to(current)
                );
            }
            return Ok(0);
        };

        ui::info("Retrieving ton-blockchain meta-data");
        let node = self.client.resolve_node_revision(
            &self.dirs,
            self.config.node_version.as_deref(),
            self.config.force,
        )?;
        if warn_unpinned_build(node.current.as_deref(), self.config.node_version.as_deref()) {
            ui::warning("No built version of ton-blockchain was found, will use the latest commit.");
        }

        // Confirm
        println!();
        ui::pre_message(&self.dirs.bin_dir);
        println!();
        let credential = prompts::acquire_sudo(self.config.accept_all)?;
        prompts::confirm_proceed(self.config.accept_all)?;
        signal::check()?;

        // EnsureDirectories
        self.ensure_directories()?;

        // BuildEnvironment
        let env = self.build_environment(&version)?;
        signal::check()?;

        // BuildNativeSources
        if let Some(revision) = node.target.as_deref() {
            self.build_node_sources(revision, credential.as_ref())?;
            signal::check()?;
        }

        // LinkBinary + PersistVersionMarkers
        self.publish(&version, &env, &node)?;

        println!();
        ui::success(&format!(
            "Successfully installed {} ({})",
            Style::new().bold().apply_to("ton-node-control"),
            Style::new().bold().apply_to(&version),
        ));
        Ok(0)
    }

    /// Remove the whole module directory tree. Destructive by design: the
    /// user asked for it, so there is no backup.
    pub fn uninstall(&self) -> Result<i32> {
        if !self.dirs.module_dir.exists() {
            ui::warning("ton-node-control is not currently installed.");
            return Ok(1);
        }

        match metadata::read_version_marker(&self.dirs.version_file()) {
            Some(version) => ui::info(&format!(
                "Removing ton-node-control ({})",
                Style::new().bold().apply_to(&version)
            )),
            None => ui::info("Removing ton-node-control"),
        }

        fs::remove_dir_all(&self.dirs.module_dir)?;
        Ok(0)
    }

    fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.dirs.module_dir)?;
        fs::create_dir_all(&self.dirs.bin_dir)?;
        fs::create_dir_all(&self.dirs.node_build_dir)?;
        Ok(())
    }

    /// Reversible environment stage: save any existing venv aside, build a
    /// fresh one and install the tool into it. The guard restores the
    /// saved environment on any failure in between.
    fn build_environment(&self, version: &str) -> Result<VirtualEnvironment> {
        let progress = ui::InstallProgress::new(version);
        let venv_path = self.dirs.venv_path();

        if venv_path.exists() {
            progress.step("Saving existing environment");
        }
        let stage = StagedDir::begin(&venv_path, ENV_SUFFIX)?;

        progress.step("Creating environment");
        let env = VirtualEnvironment::make(&self.client, stage.path())?;

        progress.step("Installing ton-node-control");
        env.install_tool(version)?;

        stage.commit();
        progress.finish();
        Ok(env)
    }

    /// Reversible build stage over the node build directory, with the same
    /// save/restore discipline as the environment stage.
    fn build_node_sources(
        &self,
        revision: &str,
        credential: Option<&SudoCredential>,
    ) -> Result<()> {
        let progress = ui::InstallProgress::new(short_revision(revision));
        let build_dir = &self.dirs.node_build_dir;

        if build_dir.exists() {
            progress.step("Saving existing build");
        }
        let stage = StagedDir::begin(build_dir, BUILD_SUFFIX)?;

        progress.step("Preparing ton-blockchain sources for compilation");
        let compiler = Compiler::prepare(stage.path(), credential)?;

        progress.step("Fetching ton-blockchain sources");
        let scratch = tempfile::Builder::new()
            .prefix("ton-blockchain-installer")
            .tempdir()?;
        let sources = compiler.fetch_sources(
            &self.client,
            revision,
            self.config.git.as_deref(),
            scratch.path(),
        )?;

        progress.step("Running cmake");
        compiler.configure(&sources)?;

        progress.step("Compiling ton-blockchain");
        compiler.build()?;

        stage.commit();
        progress.finish();
        Ok(())
    }

    fn publish(
        &self,
        version: &str,
        env: &VirtualEnvironment,
        node: &Resolution,
    ) -> Result<()> {
        let progress = ui::InstallProgress::new(version);
        progress.step("Creating executable");
        linker::publish(&self.dirs.bin_dir, env)?;

        fs::write(self.dirs.version_file(), version)?;
        if let Some(revision) = node.target.as_deref() {
            fs::write(
                self.dirs.node_version_file(),
                metadata::node_marker_value(revision),
            )?;
        }

        progress.step("Done");
        progress.finish();
        Ok(())
    }
}

/// Abbreviated commit sha for status lines
fn short_revision(revision: &str) -> &str {
    revision.get(..6).unwrap_or(revision)
}

/// The "will use the latest commit" note applies only when nothing was
/// built before and no commit was pinned on the command line.
fn warn_unpinned_build(current: Option<&str>, pinned: Option<&str>) -> bool {
    current.is_none() && pinned.is_none()
}
