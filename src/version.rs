//! Version string parsing and ordering
//!
//! A `VersionRecord` is the parsed form of a release identifier like
//! `2.3.0`, `v1.2`, `1.2.0-rc1` or `0.9.0.dev2`. It exists only for the
//! duration of a comparison; nothing retains it.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Accepted version pattern: optional `v` prefix, up to four numeric parts
/// (the fourth is ignored), an optional prerelease suffix and an ignored
/// `+build` tail.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(
        r"(?x)
        ^v?
        (?P<major>\d+)
        (?:\.(?P<minor>\d+))?
        (?:\.(?P<patch>\d+))?
        (?:\.\d+)?
        (?P<pre>
            [._-]?
            (?:(?:stable|beta|b|rc|RC|alpha|a|patch|pl|p)(?:[.-]?\d+)*)?
            (?:[.-]?dev\d*)?
        )?
        (?:\+\S+)?
        $",
    )
    .expect("version pattern is valid")
});

/// Parsed semantic-version-like tuple, used only for ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Raw prerelease suffix, if any. Participates in *filtering* (a
    /// prerelease is skipped when picking the latest stable version) but
    /// never in ordering.
    pub prerelease: Option<String>,
}

impl VersionRecord {
    /// Parse a version string. Returns `None` when the string does not
    /// match the accepted pattern.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(input.trim())?;
        let number = |name: &str| -> u64 {
            caps.name(name)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        let prerelease = caps
            .name("pre")
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            major: number("major"),
            minor: number("minor"),
            patch: number("patch"),
            prerelease,
        })
    }

    /// Whether this version carries a prerelease suffix.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Order by the numeric (major, minor, patch) triple.
    ///
    /// The prerelease suffix is deliberately not an ordering key: two
    /// versions equal in their triple compare `Equal` even when only one
    /// of them is a prerelease. Latest-stable selection stays simple at
    /// the cost of not ordering two prereleases against each other.
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

/// Compare two version strings by their parsed numeric triples.
///
/// Unparseable strings sort below everything so they are never picked as
/// the latest release.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (VersionRecord::parse(a), VersionRecord::parse(b)) {
        (Some(va), Some(vb)) => va.compare(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_triple() {
        let v = VersionRecord::parse("2.3.0").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (2, 3, 0));
        assert!(!v.is_prerelease());
    }

    #[test]
    fn test_parse_v_prefix_and_partial() {
        let v = VersionRecord::parse("v1.2").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 0));
    }

    #[test]
    fn test_parse_prerelease_suffixes() {
        for s in ["1.2.0-rc1", "1.2.0a1", "1.2.0.beta2", "0.9.0.dev2"] {
            let v = VersionRecord::parse(s).unwrap();
            assert!(v.is_prerelease(), "{s} should be a prerelease");
        }
    }

    #[test]
    fn test_parse_build_metadata_ignored() {
        let v = VersionRecord::parse("1.2.3+linux.x86").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert!(!v.is_prerelease());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(VersionRecord::parse("not-a-version").is_none());
        assert!(VersionRecord::parse("1.2.3 junk").is_none());
        assert!(VersionRecord::parse("").is_none());
    }

    #[test]
    fn test_ordering_is_numeric_not_lexicographic() {
        assert_eq!(compare_versions("2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.3", "1.2.2"), Ordering::Greater);
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("0.9.9", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_ordering_ignores_prerelease_suffix() {
        // Documented limitation: the suffix filters, it does not order.
        assert_eq!(compare_versions("1.2.0", "1.2.0-rc1"), Ordering::Equal);
        assert_eq!(compare_versions("1.2.0-rc1", "1.2.0-rc2"), Ordering::Equal);
    }

    #[test]
    fn test_sorting_with_comparator() {
        let mut versions = vec!["1.9.9", "2.0.0", "0.1.0", "1.10.0"];
        versions.sort_by(|a, b| compare_versions(a, b));
        assert_eq!(versions, vec!["0.1.0", "1.9.9", "1.10.0", "2.0.0"]);
    }
}
