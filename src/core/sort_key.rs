//! Sort keys for versions.
//!
//! [`for_sorting`] turns a version into a string whose ordinary byte-wise
//! ordering follows semver precedence (semver.org, clause 11), with every
//! release sorting after all prereleases of the same `X.Y.Z`. Keys are
//! one-directional: only their relative order is meaningful.
//!
//! Encoding of each component:
//! - all-digit components get a length prefix, then the digits verbatim;
//! - other components get `~`, then the text verbatim;
//! - `.` becomes `,` and `-` stays `-`; both sort below every prefix
//!   letter, digit and `~`, and `,` < `-` so a finished identifier sorts
//!   before one that continues;
//! - `+build` is dropped;
//! - a version without a prerelease gets a trailing `~`.

/// Byte emitted before a non-numeric component.
const NON_NUMERIC: char = '~';

/// Byte appended to versions without a prerelease.
const RELEASE_MARKER: char = '~';

/// Number of single-letter length prefixes (`a`..=`y`).
const SINGLE_LETTERS: usize = 25;

/// Encode `version` so that comparing encodings orders the versions.
///
/// `version` is assumed to be valid; a leading `v` is skipped.
///
/// ```
/// use stdver::core::sort_key::for_sorting;
///
/// assert_eq!(for_sorting("v1.2.3"), "1,2,3~");
/// assert_eq!(for_sorting("v12.48.301"), "a12,a48,b301~");
/// assert_eq!(for_sorting("v1.2.3-rc.12"), "1,2,3-~rc,a12");
/// assert!(for_sorting("v1.2.0") > for_sorting("v1.2.0-beta.1"));
/// ```
pub fn for_sorting(version: &str) -> String {
    let body = version.strip_prefix('v').unwrap_or(version);
    let body = body.split_once('+').map_or(body, |(head, _)| head);

    let mut out = String::with_capacity(body.len() + 8);
    let mut has_prerelease = false;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if c == '.' || c == '-' {
            append_component(&mut out, &body[start..i]);
            if c == '.' {
                out.push(',');
            } else {
                has_prerelease = true;
                out.push('-');
            }
            start = i + 1;
        }
    }
    append_component(&mut out, &body[start..]);

    if !has_prerelease {
        out.push(RELEASE_MARKER);
    }
    out
}

fn append_component(out: &mut String, component: &str) {
    if component.is_empty() {
        return;
    }
    if component.bytes().all(|b| b.is_ascii_digit()) {
        append_numeric_prefix(out, component.len());
        out.push_str(component);
    } else {
        out.push(NON_NUMERIC);
        out.push_str(component);
    }
}

/// Append a prefix encoding a digit count `n`, so that prefixes compare in
/// the same order as the counts.
///
/// `n - 1` is written with letters: nothing for a single digit, `a`..`y`
/// for 1..=25, and `z` followed by the encoding of the remainder beyond
/// that.
pub fn append_numeric_prefix(out: &mut String, n: usize) {
    let mut rest = n.saturating_sub(1);
    while rest > SINGLE_LETTERS {
        out.push('z');
        rest -= SINGLE_LETTERS;
    }
    if rest > 0 {
        out.push((b'a' + (rest as u8) - 1) as char);
    }
}
