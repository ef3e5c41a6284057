//! Mapping between release tags and semantic versions.
//!
//! Tags look like `go1.13`, `go1.14.6`, `go1.13beta1` or `go1.9rc2`. Their
//! prerelease form (`beta1`) does not sort correctly, since `beta10` would
//! come before `beta9`, so versions always use the dotted form
//! (`-beta.1`).

use std::cmp::Ordering;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::version::{canonical, compare, is_valid, prerelease, LATEST};
use crate::stdlib::{is_supported_branch, BRANCH_PSEUDO_PREFIX, MASTER_BRANCH, ZERO_PATCH_TAG_SINCE};
use crate::util::errors::Error;

const TAG_PREFIX: &str = "go";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^go(\d+\.\d+)(\.\d+|)((beta|rc)(\d+))?$").expect("tag pattern is valid")
});

/// The semantic version for a release tag, or `None` when the tag is not
/// a release.
///
/// `latest` and supported branch names map to themselves.
///
/// ```
/// use stdver::stdlib::version_for_tag;
///
/// assert_eq!(version_for_tag("go1").as_deref(), Some("v1.0.0"));
/// assert_eq!(version_for_tag("go1.13beta1").as_deref(), Some("v1.13.0-beta.1"));
/// assert_eq!(version_for_tag("weekly.2011-12-22"), None);
/// ```
pub fn version_for_tag(tag: &str) -> Option<String> {
    match tag {
        "go1" => return Some("v1.0.0".to_string()),
        "go1.0" => return None,
        _ => {}
    }
    if tag == LATEST || is_supported_branch(tag) {
        return Some(tag.to_string());
    }

    let caps = TAG_RE.captures(tag)?;
    let mut version = format!("v{}", &caps[1]);
    match caps.get(2).map(|m| m.as_str()) {
        Some(patch) if !patch.is_empty() => version.push_str(patch),
        _ => version.push_str(".0"),
    }
    if let (Some(kind), Some(number)) = (caps.get(4), caps.get(5)) {
        version.push('-');
        version.push_str(kind.as_str());
        version.push('.');
        version.push_str(number.as_str());
    }
    Some(version)
}

/// The release tag (or branch) for a semantic version.
///
/// Any version beginning with `v0.0.0` is taken to be tracking the
/// mainline branch. A `.0` patch is dropped before `v1.21.0`, so `v1.20.0`
/// is `go1.20` while `v1.21.0` is `go1.21.0`.
pub fn tag_for_version(version: &str) -> Result<String> {
    if is_supported_branch(version) {
        return Ok(version.to_string());
    }
    if version.starts_with(BRANCH_PSEUDO_PREFIX) {
        return Ok(MASTER_BRANCH.to_string());
    }
    if version == "v1.0.0" {
        return Ok("go1".to_string());
    }
    if !is_valid(version) {
        return Err(Error::invalid_argument(format!(
            "tag_for_version({:?}): requested version is not a valid semantic version",
            version
        ))
        .into());
    }

    let canonical = canonical(version).unwrap_or_default();
    let pre = prerelease(&canonical);
    let release = &canonical[1..canonical.len() - pre.len()];
    if release == "1.0.0" && pre.is_empty() {
        return Ok("go1".to_string());
    }

    // Releases from go1.21.0 on keep their `.0` patch; prereleases never do.
    let keep_zero_patch =
        pre.is_empty() && compare(&canonical, ZERO_PATCH_TAG_SINCE) != Ordering::Less;
    let mut tag = String::from(TAG_PREFIX);
    if keep_zero_patch {
        tag.push_str(release);
    } else {
        tag.push_str(release.strip_suffix(".0").unwrap_or(release));
    }

    if !pre.is_empty() {
        let pre = &pre[1..];
        match final_digits_index(pre) {
            Some(i) if i >= 1 => {
                if pre.as_bytes()[i - 1] != b'.' {
                    return Err(Error::invalid_argument(format!(
                        "tag_for_version({:?}): final digits in a prerelease must follow a period",
                        version
                    ))
                    .into());
                }
                tag.push_str(&pre[..i - 1]);
                tag.push_str(&pre[i..]);
            }
            Some(_) => {
                return Err(Error::invalid_argument(format!(
                    "tag_for_version({:?}): prerelease must name its kind before its number",
                    version
                ))
                .into());
            }
            None => tag.push_str(pre),
        }
    }
    Ok(tag)
}

/// The major line of a version, e.g. `v1.13.3` → `go1`.
pub fn major_version_for_version(version: &str) -> Result<String> {
    let tag = tag_for_version(version)
        .map_err(|e| e.context(format!("major_version_for_version({:?})", version)))?;
    Ok(match tag.find('.') {
        Some(i) => tag[..i].to_string(),
        None => tag,
    })
}

/// Index of the first byte of the digit run ending `s`, if `s` ends in a
/// digit.
fn final_digits_index(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.last()?.is_ascii_digit() {
        return None;
    }
    let start = bytes
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    Some(start)
}
