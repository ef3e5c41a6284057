//! Version parsing and classification.
//!
//! Versions are plain strings of the form
//! `vMAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`. The shorthands `vMAJOR` and
//! `vMAJOR.MINOR` are accepted and behave like their `.0`-completed form.
//! Parsing is delegated to the `semver` crate once the leading `v` has been
//! stripped and shorthands expanded.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use semver::Version;

use crate::util::errors::Error;

/// The requested-version token meaning "whatever is newest".
pub const LATEST: &str = "latest";

/// Build suffix marking a major-version-incompatible import.
pub const INCOMPATIBLE_SUFFIX: &str = "+incompatible";

/// Layout of the timestamp embedded in a pseudo-version.
const PSEUDO_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of hash characters kept in a pseudo-version.
const PSEUDO_HASH_LEN: usize = 12;

static PSEUDO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v[0-9]+\.[0-9]+\.[0-9]+-(([^+]*\.)?0\.)?[0-9]{14}-[A-Za-z0-9]+(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("pseudo-version pattern is valid")
});

/// Classification of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionType {
    /// A release such as `v1.2.3`.
    Release,
    /// A tagged prerelease such as `v1.2.3-beta.1`.
    Prerelease,
    /// A synthesized version for an untagged commit.
    Pseudo,
}

impl VersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Release => "release",
            VersionType::Prerelease => "prerelease",
            VersionType::Pseudo => "pseudo",
        }
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `v`-prefixed version, expanding the `vX` and `vX.Y` shorthands.
///
/// Core components must fit in a `u64`; larger numbers are reported as
/// invalid even though the version grammar itself places no bound on them.
pub fn parse(v: &str) -> Option<Version> {
    let rest = v.strip_prefix('v')?;
    let core_end = rest.find(['-', '+']).unwrap_or(rest.len());
    let has_suffix = core_end < rest.len();

    let expanded = match rest[..core_end].matches('.').count() {
        0 if !has_suffix => format!("{}.0.0", rest),
        1 if !has_suffix => format!("{}.0", rest),
        2 => rest.to_string(),
        _ => return None,
    };

    Version::parse(&expanded).ok()
}

/// Whether `v` is a valid `v`-prefixed semantic version.
pub fn is_valid(v: &str) -> bool {
    parse(v).is_some()
}

/// The canonical `vX.Y.Z[-pre]` form of `v`, with build metadata dropped.
pub fn canonical(v: &str) -> Option<String> {
    let parsed = parse(v)?;
    let mut out = format!("v{}.{}.{}", parsed.major, parsed.minor, parsed.patch);
    if !parsed.pre.is_empty() {
        out.push('-');
        out.push_str(parsed.pre.as_str());
    }
    Some(out)
}

/// The prerelease suffix of `v` including its leading `-`, or `""`.
pub fn prerelease(v: &str) -> &str {
    if !is_valid(v) {
        return "";
    }
    let without_build = v.split_once('+').map_or(v, |(head, _)| head);
    without_build.find('-').map_or("", |i| &without_build[i..])
}

/// Compare by semver precedence, ignoring build metadata.
///
/// An invalid version compares less than any valid one, and two invalid
/// versions compare equal.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => (a.major, a.minor, a.patch, &a.pre).cmp(&(
            b.major,
            b.minor,
            b.patch,
            &b.pre,
        )),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Whether `v` is a pseudo-version.
///
/// The hyphen count guards against a prerelease that merely resembles the
/// pseudo layout.
pub fn is_pseudo(v: &str) -> bool {
    v.matches('-').count() >= 2 && PSEUDO_VERSION_RE.is_match(v)
}

/// Whether `v` carries the `+incompatible` build suffix.
pub fn is_incompatible(v: &str) -> bool {
    v.ends_with(INCOMPATIBLE_SUFFIX)
}

/// Classify `v`, failing when it is not valid semver.
pub fn parse_type(v: &str) -> Result<VersionType> {
    if !is_valid(v) {
        return Err(Error::invalid_argument(format!("parse_type({:?}): invalid semver", v)).into());
    }
    let ty = if is_pseudo(v) {
        VersionType::Pseudo
    } else if !prerelease(v).is_empty() {
        VersionType::Prerelease
    } else {
        VersionType::Release
    };
    Ok(ty)
}

/// Build a pseudo-version from a base version, commit time and hash.
pub fn pseudo_version(base: &str, time: DateTime<Utc>, hash: &str) -> String {
    let short = hash.get(..PSEUDO_HASH_LEN).unwrap_or(hash);
    format!("{}-{}-{}", base, time.format(PSEUDO_TIME_FORMAT), short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_shorthands() {
        assert_eq!(parse("v1"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse("v1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert!(parse("1.2.3").is_none());
        assert!(parse("v1.2-beta").is_none());
        assert!(parse("v1.2.3.4").is_none());
        assert!(parse("v01.2.3").is_none());
        assert!(parse("vx.y.z").is_none());
    }

    #[test]
    fn test_canonical() {
        assert_eq!(canonical("v1.13").as_deref(), Some("v1.13.0"));
        assert_eq!(
            canonical("v1.13.0-beta.1+build").as_deref(),
            Some("v1.13.0-beta.1")
        );
        assert_eq!(canonical("v2.0.0+incompatible").as_deref(), Some("v2.0.0"));
        assert_eq!(canonical("latest"), None);
    }

    #[test]
    fn test_prerelease() {
        assert_eq!(prerelease("v1.2.3"), "");
        assert_eq!(prerelease("v1.2.3-beta.1"), "-beta.1");
        assert_eq!(prerelease("v1.2.3-rc.1+build-7"), "-rc.1");
        assert_eq!(
            prerelease("v0.0.0-20200213210520-70da2b031ef3"),
            "-20200213210520-70da2b031ef3"
        );
        assert_eq!(prerelease("bogus-1"), "");
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare("v1.2.3", "v1.2.3"), Ordering::Equal);
        assert_eq!(compare("v1.2.3", "v1.10.0"), Ordering::Less);
        assert_eq!(compare("v1.2.0", "v1.2.0-rc.1"), Ordering::Greater);
        assert_eq!(compare("v1.2.0-rc.2", "v1.2.0-rc.10"), Ordering::Less);
        assert_eq!(compare("v1.0.0+a", "v1.0.0+b"), Ordering::Equal);
        assert_eq!(compare("v1", "v1.0.0"), Ordering::Equal);
        assert_eq!(compare("junk", "v0.0.1"), Ordering::Less);
        assert_eq!(compare("junk", "other"), Ordering::Equal);
    }

    #[test]
    fn test_is_pseudo() {
        assert!(is_pseudo("v0.0.0-20200213210520-70da2b031ef3"));
        assert!(is_pseudo("v1.2.4-0.20191109021931-daa7c04131f5"));
        assert!(is_pseudo("v1.9.0-20230101000000-abcdef123456"));
        assert!(is_pseudo("v2.0.1-0.20170101000000-abcdef123456+incompatible"));
        assert!(is_pseudo("v1.2.3-pre.0.20191109021931-daa7c04131f5"));
        assert!(!is_pseudo("v1.2.3-rc.20230101000000-abcdef123456"));
        assert!(!is_pseudo("v1.2.3-beta.1"));
        assert!(!is_pseudo("v1.2.3-20200213210520"));
        assert!(!is_pseudo("v1.2.3"));
    }

    #[test]
    fn test_is_incompatible() {
        assert!(is_incompatible("v2.0.0+incompatible"));
        assert!(!is_incompatible("v2.0.0"));
        assert!(!is_incompatible("v2.0.0+incompatible.1"));
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(parse_type("v1.2.3").unwrap(), VersionType::Release);
        assert_eq!(parse_type("v1.2.3+incompatible").unwrap(), VersionType::Release);
        assert_eq!(parse_type("v1.2.3-rc.1").unwrap(), VersionType::Prerelease);
        assert_eq!(
            parse_type("v0.0.0-20200213210520-70da2b031ef3").unwrap(),
            VersionType::Pseudo
        );
        assert!(parse_type("1.2.3").is_err());
        assert!(parse_type("master").is_err());
    }

    #[test]
    fn test_parse_type_agrees_with_is_pseudo() {
        for v in [
            "v1.0.0",
            "v1.0.0-alpha",
            "v1.0.0-alpha.1-2",
            "v0.0.0-20200213210520-70da2b031ef3",
            "v1.2.4-0.20191109021931-daa7c04131f5",
            "v3.0.0-20191109021931-daa7c04131f5+incompatible",
        ] {
            let ty = parse_type(v).unwrap();
            assert_eq!(is_pseudo(v), ty == VersionType::Pseudo, "{}", v);
        }
    }

    #[test]
    fn test_invalid_argument_kind() {
        let err = parse_type("v1.2.3.4").unwrap_err();
        assert_eq!(
            Error::kind_of(&err),
            Some(crate::util::errors::ErrorKind::InvalidArgument)
        );
    }

    #[test]
    fn test_pseudo_version() {
        let time = Utc.with_ymd_and_hms(2020, 2, 13, 21, 5, 20).unwrap();
        let v = pseudo_version("v0.0.0", time, "70da2b031ef3a1b2c3d4e5f60718293a4b5c6d7e");
        assert_eq!(v, "v0.0.0-20200213210520-70da2b031ef3");
        assert!(is_pseudo(&v));
    }
}
