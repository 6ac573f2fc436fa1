//! Remote release metadata
//!
//! Fetches the ton-node-control release set from the package registry and
//! the ton-blockchain commit history from the source forge, then picks the
//! version/revision to install. Selection is pure over the fetched lists so
//! it can be tested without network access.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{InstallError, Result};
use crate::paths::Directories;
use crate::version::{VersionRecord, compare_versions};

const REGISTRY_URL: &str = "https://pypi.org/pypi/ton-node-control/json";
const COMMITS_URL: &str = "https://api.github.com/repos/ton-blockchain/ton/commits";
const TARBALL_URL: &str = "https://api.github.com/repos/ton-blockchain/ton/tarball";
const USER_AGENT: &str = "ton-node-control";

/// Registry metadata; only the release identifiers are used
#[derive(Debug, Deserialize)]
struct RegistryMetadata {
    releases: BTreeMap<String, serde_json::Value>,
}

/// One entry of the commit-history listing, newest first
#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
}

/// Outcome of resolving a target against what is already installed.
///
/// `target == None` means "already up to date": the currently installed
/// version equals the selected one and no force flag was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: Option<String>,
    pub current: Option<String>,
}

/// Blocking HTTP client for registry and forge metadata
pub struct MetadataClient {
    http: reqwest::blocking::Client,
}

impl MetadataClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }

    /// Resolve the ton-node-control version to install.
    pub fn resolve_tool_version(
        &self,
        dirs: &Directories,
        explicit: Option<&str>,
        preview: bool,
        force: bool,
    ) -> Result<Resolution> {
        let current = read_version_marker(&dirs.version_file());

        let meta: RegistryMetadata = self.get_json(REGISTRY_URL)?;
        let releases: Vec<String> = meta.releases.into_keys().collect();

        let selected = select_release(&releases, explicit, preview)?;
        if !force && current.as_deref() == Some(selected.as_str()) {
            return Ok(Resolution {
                target: None,
                current,
            });
        }

        Ok(Resolution {
            target: Some(selected),
            current,
        })
    }

    /// Resolve the ton-blockchain commit to build.
    ///
    /// With no pinned revision and no prior build the most recent commit is
    /// selected; an equal already-built revision skips the build stage
    /// unless forced.
    pub fn resolve_node_revision(
        &self,
        dirs: &Directories,
        explicit: Option<&str>,
        force: bool,
    ) -> Result<Resolution> {
        let current = read_node_marker(&dirs.node_version_file()).map(|(sha, _)| sha);

        let commits: Vec<CommitEntry> = self.get_json(COMMITS_URL)?;
        let shas: Vec<String> = commits.into_iter().map(|c| c.sha).collect();

        let selected = select_revision(&shas, explicit)?;
        if !force && current.as_deref() == Some(selected.as_str()) {
            return Ok(Resolution {
                target: None,
                current,
            });
        }

        Ok(Resolution {
            target: Some(selected),
            current,
        })
    }

    /// Download a file into memory (source tarballs, bootstrap packages).
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        serde_json::from_str(&body).map_err(InstallError::from)
    }
}

/// Templated download URL for a pinned source snapshot
pub fn tarball_url(revision: &str) -> String {
    format!("{TARBALL_URL}/{revision}")
}

/// Pick the release to install from the published set.
///
/// An explicit version must be present in the set; otherwise the highest
/// version by numeric-triple order wins, skipping prereleases unless
/// `preview` opts in.
pub fn select_release(releases: &[String], explicit: Option<&str>, preview: bool) -> Result<String> {
    if let Some(version) = explicit {
        if !releases.iter().any(|r| r == version) {
            return Err(InstallError::VersionNotFound {
                version: version.to_string(),
            });
        }
        return Ok(version.to_string());
    }

    let mut sorted = releases.to_vec();
    sorted.sort_by(|a, b| compare_versions(a, b));

    for release in sorted.iter().rev() {
        match VersionRecord::parse(release) {
            Some(record) if record.is_prerelease() && !preview => continue,
            Some(_) => return Ok(release.clone()),
            None => continue,
        }
    }

    Err(InstallError::MetadataParse {
        reason: "no installable release found in registry metadata".to_string(),
    })
}

/// Pick the commit to build from the history listing (newest first).
pub fn select_revision(commits: &[String], explicit: Option<&str>) -> Result<String> {
    if let Some(revision) = explicit {
        if !commits.iter().any(|c| c == revision) {
            return Err(InstallError::RevisionNotFound {
                revision: revision.to_string(),
            });
        }
        return Ok(revision.to_string());
    }

    commits
        .first()
        .cloned()
        .ok_or_else(|| InstallError::MetadataParse {
            reason: "commit history listing is empty".to_string(),
        })
}

/// Read a plain version marker, if present.
pub fn read_version_marker(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read a node build marker: `sha` optionally followed by `:<rfc3339>`.
pub fn read_node_marker(path: &Path) -> Option<(String, Option<DateTime<Utc>>)> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.split_once(':') {
        Some((sha, stamp)) => {
            let built_at = DateTime::parse_from_rfc3339(stamp)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
            Some((sha.to_string(), built_at))
        }
        None => Some((trimmed.to_string(), None)),
    }
}

/// Marker value for a freshly built revision.
pub fn node_marker_value(revision: &str) -> String {
    format!("{revision}:{}", Utc::now().to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn releases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_release_latest_stable() {
        let set = releases(&["1.9.9", "2.3.0", "2.4.0-rc1", "0.1.0"]);
        assert_eq!(select_release(&set, None, false).unwrap(), "2.3.0");
    }

    #[test]
    fn test_select_release_preview_allows_prerelease() {
        let set = releases(&["1.9.9", "2.3.0", "2.4.0-rc1"]);
        assert_eq!(select_release(&set, None, true).unwrap(), "2.4.0-rc1");
    }

    #[test]
    fn test_select_release_explicit_must_exist() {
        let set = releases(&["1.0.0", "2.3.0"]);
        assert_eq!(select_release(&set, Some("2.3.0"), false).unwrap(), "2.3.0");
        let err = select_release(&set, Some("9.9.9"), false).unwrap_err();
        assert!(matches!(err, InstallError::VersionNotFound { version } if version == "9.9.9"));
    }

    #[test]
    fn test_select_release_explicit_prerelease_allowed_without_preview() {
        // Explicit selection bypasses the prerelease filter.
        let set = releases(&["2.4.0-rc1"]);
        assert_eq!(
            select_release(&set, Some("2.4.0-rc1"), false).unwrap(),
            "2.4.0-rc1"
        );
    }

    #[test]
    fn test_select_release_only_prereleases_without_preview() {
        let set = releases(&["2.4.0-rc1", "2.4.0-rc2"]);
        assert!(select_release(&set, None, false).is_err());
    }

    #[test]
    fn test_select_revision_defaults_to_newest() {
        let commits = releases(&["ffff", "eeee", "dddd"]);
        assert_eq!(select_revision(&commits, None).unwrap(), "ffff");
    }

    #[test]
    fn test_select_revision_explicit_must_exist() {
        let commits = releases(&["ffff", "eeee"]);
        assert_eq!(select_revision(&commits, Some("eeee")).unwrap(), "eeee");
        let err = select_revision(&commits, Some("0000")).unwrap_err();
        assert!(matches!(err, InstallError::RevisionNotFound { .. }));
    }

    #[test]
    fn test_version_marker_roundtrip() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("VERSION");
        assert_eq!(read_version_marker(&marker), None);

        fs::write(&marker, "2.3.0\n").unwrap();
        assert_eq!(read_version_marker(&marker), Some("2.3.0".to_string()));
    }

    #[test]
    fn test_node_marker_with_timestamp() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("VERSION");
        fs::write(&marker, "1e3bd1d0:2024-06-01T12:30:00+00:00\n").unwrap();

        let (sha, built_at) = read_node_marker(&marker).unwrap();
        assert_eq!(sha, "1e3bd1d0");
        assert!(built_at.is_some());
    }

    #[test]
    fn test_node_marker_without_timestamp() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("VERSION");
        fs::write(&marker, "1e3bd1d0").unwrap();

        let (sha, built_at) = read_node_marker(&marker).unwrap();
        assert_eq!(sha, "1e3bd1d0");
        assert_eq!(built_at, None);
    }

    #[test]
    fn test_node_marker_value_parses_back() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("VERSION");
        fs::write(&marker, node_marker_value("abc123")).unwrap();

        let (sha, built_at) = read_node_marker(&marker).unwrap();
        assert_eq!(sha, "abc123");
        assert!(built_at.is_some());
    }

    #[test]
    fn test_tarball_url_template() {
        assert_eq!(
            tarball_url("abc123"),
            "https://api.github.com/repos/ton-blockchain/ton/tarball/abc123"
        );
    }
}
