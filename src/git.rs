//! Git source acquisition
//!
//! Full clone (no shallow history: the pinned revision can be arbitrarily
//! old) plus a hard reset to the pinned commit. The reset discards any
//! local state so the checkout is byte-identical to the revision.

use std::path::Path;

use git2::{Oid, Repository, ResetType, build::RepoBuilder};

use crate::error::{InstallError, Result};

/// Clone a repository to a target directory.
pub fn clone(url: &str, target: &Path) -> Result<Repository> {
    RepoBuilder::new()
        .clone(url, target)
        .map_err(|e| InstallError::GitClone {
            url: url.to_string(),
            reason: e.message().to_string(),
        })
}

/// Hard-reset the working tree to a specific commit.
pub fn reset_hard(repo: &Repository, revision: &str) -> Result<()> {
    let oid = Oid::from_str(revision).map_err(|e| InstallError::GitReset {
        revision: revision.to_string(),
        reason: e.message().to_string(),
    })?;

    let commit = repo
        .find_commit(oid)
        .map_err(|e| InstallError::GitReset {
            revision: revision.to_string(),
            reason: e.message().to_string(),
        })?;

    repo.reset(commit.as_object(), ResetType::Hard, None)
        .map_err(|e| InstallError::GitReset {
            revision: revision.to_string(),
            reason: e.message().to_string(),
        })
}

/// Initialize and fetch every submodule of the checkout. The node build
/// configures against third-party trees vendored as submodules, so a bare
/// clone is not buildable without this.
pub fn update_submodules(repo: &Repository) -> Result<()> {
    let submodules = repo.submodules().map_err(|e| InstallError::GitSubmodule {
        name: "<listing>".to_string(),
        reason: e.message().to_string(),
    })?;

    for mut submodule in submodules {
        submodule
            .update(true, None)
            .map_err(|e| InstallError::GitSubmodule {
                name: submodule.name().unwrap_or("<non-utf8>").to_string(),
                reason: e.message().to_string(),
            })?;
    }
    Ok(())
}
