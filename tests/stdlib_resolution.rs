//! End-to-end resolution of the standard library against canned histories.

use std::io::Read;

use chrono::{TimeZone, Utc};
use stdver::core::version::{is_pseudo, parse_type, VersionType};
use stdver::ops::{content_dir, resolve_version, versions, zip};
use stdver::sources::{FixtureBackend, FixtureHistory};
use stdver::{CancelToken, Error, ErrorKind};

fn history() -> FixtureHistory {
    let at = |d| Utc.with_ymd_and_hms(2020, 2, d, 21, 5, 20).unwrap();
    let files = |label: &str| {
        vec![
            ("README.md", "readme".to_string()),
            ("LICENSE", "license".to_string()),
            ("src/README.vendor", "vendor".to_string()),
            ("src/go.mod", "module std".to_string()),
            ("src/errors/errors.go", format!("package errors // {}", label)),
            ("src/cmd/README.vendor", "cmd vendor".to_string()),
            ("src/net/http/testdata/x.txt", "x".to_string()),
        ]
    };
    FixtureHistory::new()
        .with_tag("go1.12", at(1), files("go1.12"))
        .with_tag("go1.13beta1", at(2), files("go1.13beta1"))
        .with_tag("go1.14.6", at(3), files("go1.14.6"))
        .with_branch("master", at(13), files("master"))
}

#[test]
fn test_latest_resolves_to_newest_release() {
    let backend = FixtureBackend::new(history());
    let cancel = CancelToken::new();

    assert_eq!(resolve_version(&backend, "latest", &cancel).unwrap(), "v1.14.6");

    let archive = zip(&backend, "latest", &cancel).unwrap();
    assert_eq!(archive.version(), "v1.14.6");
    assert!(archive
        .entry_names()
        .iter()
        .any(|n| n == "std@v1.14.6/errors/errors.go"));

    let mut reader = archive.reader().unwrap();
    let mut content = String::new();
    reader
        .by_name("std@v1.14.6/errors/errors.go")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "package errors // go1.14.6");
}

#[test]
fn test_branch_archive() {
    let backend = FixtureBackend::new(history());
    let archive = zip(&backend, "master", &CancelToken::new()).unwrap();

    let version = archive.version();
    assert!(version.starts_with("v0.0.0-20200213210520-"), "{}", version);
    assert_eq!(version.len(), "v0.0.0-20200213210520-".len() + 12);
    assert!(is_pseudo(version));
    assert_eq!(parse_type(version).unwrap(), VersionType::Pseudo);
    assert_eq!(&version[22..], &archive.hash()[..12]);

    let prefix = format!("std@{}/", version);
    let names: Vec<&str> = archive
        .entry_names()
        .iter()
        .map(|n| n.strip_prefix(&prefix).unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["LICENSE", "cmd/README.vendor", "errors/errors.go"]
    );
}

#[test]
fn test_content_dir() {
    let backend = FixtureBackend::new(history());
    let (dir, version, commit_time) =
        content_dir(&backend, "v1.13.0-beta.1", &CancelToken::new()).unwrap();

    assert_eq!(version, "v1.13.0-beta.1");
    assert_eq!(commit_time, Utc.with_ymd_and_hms(2020, 2, 2, 21, 5, 20).unwrap());
    assert_eq!(
        dir.read("errors/errors.go").unwrap(),
        b"package errors // go1.13beta1"
    );
    assert!(!dir.exists("net"));
    assert!(!dir.exists("README.vendor"));

    let err = dir.read("go.mod").unwrap_err();
    assert_eq!(Error::kind_of(&err), Some(ErrorKind::NotFound));
}

#[test]
fn test_versions_skip_branches_and_noise() {
    let noise = Utc.with_ymd_and_hms(2011, 12, 22, 0, 0, 0).unwrap();
    let history = history()
        .with_tag("weekly.2011-12-22", noise, [("a", "b")])
        .with_ref("refs/changes/01/12301/1", noise, [("a", "b")]);
    let backend = FixtureBackend::new(history);

    assert_eq!(
        versions(&backend, &CancelToken::new()).unwrap(),
        vec!["v1.14.6", "v1.13.0-beta.1", "v1.12.0"]
    );
}

#[test]
fn test_empty_history_has_no_latest() {
    let backend = FixtureBackend::new(FixtureHistory::new());
    let err = resolve_version(&backend, "latest", &CancelToken::new()).unwrap_err();
    assert_eq!(Error::kind_of(&err), Some(ErrorKind::NotFound));
}

#[test]
fn test_zero_patch_release_tag() {
    let at = Utc.with_ymd_and_hms(2024, 2, 6, 21, 17, 0).unwrap();
    let history = history()
        .with_tag("go1.21.0", at, [("src/errors/errors.go", "package errors // go1.21.0")])
        .with_tag("go1.22.0", at, [("src/errors/errors.go", "package errors // go1.22.0")]);
    let backend = FixtureBackend::new(history);
    let cancel = CancelToken::new();

    assert_eq!(
        versions(&backend, &cancel).unwrap()[..2],
        ["v1.22.0", "v1.21.0"]
    );

    let archive = zip(&backend, "latest", &cancel).unwrap();
    assert_eq!(archive.version(), "v1.22.0");
    assert_eq!(archive.entry_names(), ["std@v1.22.0/errors/errors.go"]);

    let (dir, version, _) = content_dir(&backend, "v1.21.0", &cancel).unwrap();
    assert_eq!(version, "v1.21.0");
    assert_eq!(
        dir.read("errors/errors.go").unwrap(),
        b"package errors // go1.21.0"
    );
}
