//! Selection of the "latest" version from a candidate set.
//!
//! Releases are preferred to prereleases and both to pseudo-versions.
//! Inside a tier ordinary semver precedence decides.

use std::cmp::Ordering;

use anyhow::{Context, Result};

use crate::core::version::{compare, is_incompatible, is_pseudo, prerelease};

/// Whether `v1` is later than `v2`.
pub fn later(v1: &str, v2: &str) -> bool {
    let release1 = prerelease(v1).is_empty();
    let release2 = prerelease(v2).is_empty();
    if release1 && release2 {
        return compare(v1, v2) == Ordering::Greater;
    }
    if release1 != release2 {
        return release1;
    }

    // Both are prereleases.
    let pseudo1 = is_pseudo(v1);
    let pseudo2 = is_pseudo(v2);
    if pseudo1 == pseudo2 {
        compare(v1, v2) == Ordering::Greater
    } else {
        !pseudo1
    }
}

/// The latest of `versions` according to [`later`], or `None` when empty.
pub fn latest_of<I, S>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut latest: Option<S> = None;
    for v in versions {
        let replace = match &latest {
            None => true,
            Some(current) => later(v.as_ref(), current.as_ref()),
        };
        if replace {
            latest = Some(v);
        }
    }
    latest.map(|v| v.as_ref().to_string())
}

/// The version a consuming tool would pick as the default.
///
/// When the overall latest is `+incompatible`, the latest compatible
/// non-pseudo version wins instead, provided `has_manifest` reports that
/// it carries a module manifest.
pub fn latest_version<F>(versions: &[String], mut has_manifest: F) -> Result<Option<String>>
where
    F: FnMut(&str) -> Result<bool>,
{
    let Some(latest) = latest_of(versions) else {
        return Ok(None);
    };
    if !is_incompatible(&latest) {
        return Ok(Some(latest));
    }

    let compatible = latest_of(
        versions
            .iter()
            .filter(|v| !is_incompatible(v) && !is_pseudo(v)),
    );
    let Some(compatible) = compatible else {
        return Ok(Some(latest));
    };

    let present = has_manifest(&compatible)
        .with_context(|| format!("latest_version({:?})", versions))?;
    if present {
        Ok(Some(compatible))
    } else {
        Ok(Some(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_later() {
        assert!(later("v1.9.0", "v1.9.0-rc.1"));
        assert!(later("v1.9.0-rc.1", "v1.9.0-20230101000000-abcdef123456"));
        assert!(later("v1.0.0", "v2.0.0-beta.1"));
        assert!(later("v1.10.0", "v1.9.0"));
        assert!(!later("v1.9.0", "v1.10.0"));
        assert!(later("v1.0.0-alpha", "v9.0.0-0.20230101000000-abcdef123456"));
        assert!(later(
            "v0.0.0-20230201000000-abcdef123456",
            "v0.0.0-20230101000000-abcdef123456"
        ));
        assert!(later("v1.2.3-rc.20230101000000-abcdef123456", "v1.2.3-rc.1"));
        assert!(!later("v1.0.0", "v1.0.0"));
    }

    #[test]
    fn test_latest_of() {
        assert_eq!(latest_of(Vec::<String>::new()), None);
        assert_eq!(
            latest_of(["v1.2.0", "v1.10.0", "v1.11.0-rc.1", "v1.9.9"]).as_deref(),
            Some("v1.10.0")
        );
        assert_eq!(
            latest_of([
                "v0.0.0-20230201000000-abcdef123456",
                "v1.0.0-beta.1",
                "v0.9.0-alpha"
            ])
            .as_deref(),
            Some("v1.0.0-beta.1")
        );
    }

    #[test]
    fn test_latest_version_plain_latest() {
        let vs = strings(&["v1.0.0", "v1.2.0", "v1.3.0-rc.1"]);
        let got = latest_version(&vs, |_| panic!("must not be consulted")).unwrap();
        assert_eq!(got.as_deref(), Some("v1.2.0"));
    }

    #[test]
    fn test_latest_version_prefers_manifest() {
        let vs = strings(&["v1.1.0", "v1.0.0", "v2.0.0+incompatible"]);
        let mut asked = Vec::new();
        let got = latest_version(&vs, |v| {
            asked.push(v.to_string());
            Ok(true)
        })
        .unwrap();
        assert_eq!(got.as_deref(), Some("v1.1.0"));
        assert_eq!(asked, vec!["v1.1.0".to_string()]);
    }

    #[test]
    fn test_latest_version_without_manifest_keeps_incompatible() {
        let vs = strings(&["v1.0.0+incompatible", "v0.9.0"]);
        let got = latest_version(&vs, |_| Ok(false)).unwrap();
        assert_eq!(got.as_deref(), Some("v1.0.0+incompatible"));
    }

    #[test]
    fn test_latest_version_only_incompatible_or_pseudo() {
        let vs = strings(&[
            "v3.0.0+incompatible",
            "v0.0.0-20230101000000-abcdef123456",
        ]);
        let got = latest_version(&vs, |_| panic!("must not be consulted")).unwrap();
        assert_eq!(got.as_deref(), Some("v3.0.0+incompatible"));
    }

    #[test]
    fn test_latest_version_empty() {
        assert_eq!(latest_version(&[], |_| Ok(true)).unwrap(), None);
    }

    #[test]
    fn test_latest_version_propagates_predicate_error() {
        let vs = strings(&["v1.0.0", "v2.0.0+incompatible"]);
        let err = latest_version(&vs, |_| anyhow::bail!("storage unavailable")).unwrap_err();
        assert!(format!("{:#}", err).contains("storage unavailable"));
    }
}
