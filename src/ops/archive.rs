//! Materialization of a resolved revision as a module zip archive.
//!
//! The archive holds the repository's top-level files and the library
//! directory's tree, both placed at the archive root under a
//! `<module>@<version>/` prefix. Archives are built fresh for every request.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use git2::{ObjectType, Repository, Tree};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::ops::content::ContentDir;
use crate::ops::resolve::{resolve_revision, ResolvedRevision};
use crate::sources::RepoBackend;
use crate::stdlib::{directory, MODULE_PATH};
use crate::util::cancel::CancelToken;
use crate::util::errors::{git_error, Error};
use crate::util::hash::sha256_bytes;

const BLOB_MODE: i32 = 0o100644;
const EXECUTABLE_MODE: i32 = 0o100755;

/// A module zip together with the revision it was built from.
#[derive(Debug, Clone)]
pub struct Archive {
    module_path: String,
    version: String,
    hash: String,
    commit_time: DateTime<Utc>,
    entries: Vec<String>,
    bytes: Vec<u8>,
}

impl Archive {
    /// The zip file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Entry names in the order they were written.
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    /// Random access to the archive entries.
    pub fn reader(&self) -> Result<ZipArchive<Cursor<&[u8]>>> {
        ZipArchive::new(Cursor::new(self.bytes.as_slice()))
            .with_context(|| format!("failed to read archive {}@{}", self.module_path, self.version))
    }

    /// The archive contents with the module prefix stripped.
    pub fn content_dir(&self) -> Result<ContentDir> {
        let prefix = self.prefix();
        let mut reader = self.reader()?;
        let mut files = std::collections::BTreeMap::new();

        for i in 0..reader.len() {
            let mut file = reader
                .by_index(i)
                .with_context(|| format!("failed to read archive entry {}", i))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let Some(relative) = name.strip_prefix(&prefix) else {
                return Err(Error::invalid_argument(format!(
                    "archive entry {:?} outside {}",
                    name, prefix
                ))
                .into());
            };
            let relative = relative.to_string();

            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)
                .with_context(|| format!("failed to read archive entry {}", name))?;
            files.insert(relative, content);
        }
        Ok(ContentDir::new(files))
    }

    /// Hex SHA-256 of the zip bytes.
    pub fn sha256(&self) -> String {
        sha256_bytes(&self.bytes)
    }

    /// Write the zip to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write archive: {}", path.display()))
    }

    /// The resolved version, a pseudo-version for branch requests.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full hash of the archived commit.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn commit_time(&self) -> DateTime<Utc> {
        self.commit_time
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    fn prefix(&self) -> String {
        format!("{}@{}/", self.module_path, self.version)
    }
}

/// Resolve `requested` and build its module zip.
pub fn zip(backend: &dyn RepoBackend, requested: &str, cancel: &CancelToken) -> Result<Archive> {
    let (checkout, revision) = resolve_revision(backend, requested, cancel)
        .with_context(|| format!("zip({:?})", requested))?;
    materialize(checkout.repo(), &revision, cancel)
        .with_context(|| format!("zip({:?})", requested))
}

/// Resolve `requested` and expose its module content as a directory view.
pub fn content_dir(
    backend: &dyn RepoBackend,
    requested: &str,
    cancel: &CancelToken,
) -> Result<(ContentDir, String, DateTime<Utc>)> {
    let archive = zip(backend, requested, cancel)
        .with_context(|| format!("content_dir({:?})", requested))?;
    let dir = archive.content_dir()?;
    Ok((dir, archive.version, archive.commit_time))
}

/// Build the module zip for an already resolved revision.
pub fn materialize(
    repo: &Repository,
    revision: &ResolvedRevision,
    cancel: &CancelToken,
) -> Result<Archive> {
    let root = repo
        .find_tree(revision.tree)
        .map_err(|e| git_error(format!("find tree {}", revision.tree), e))?;

    let libdir = directory(&revision.version);
    let entry = root.get_path(Path::new(libdir)).map_err(|_| {
        Error::not_found(format!("{} has no {} directory", revision.version, libdir))
    })?;
    if entry.kind() != Some(ObjectType::Tree) {
        return Err(Error::not_found(format!(
            "{} in {} is not a directory",
            libdir, revision.version
        ))
        .into());
    }
    let lib = repo
        .find_tree(entry.id())
        .map_err(|e| git_error(format!("find tree {}", libdir), e))?;

    let mut builder = ZipBuilder::new(
        format!("{}@{}/", MODULE_PATH, revision.version),
        revision.commit_time,
        cancel,
    );
    builder.add_tree(repo, &root, "", false)?;
    builder.add_tree(repo, &lib, "", true)?;
    let (entries, bytes) = builder.finish()?;

    tracing::info!(
        "Created {}@{} archive ({} files)",
        MODULE_PATH,
        revision.version,
        entries.len()
    );

    Ok(Archive {
        module_path: MODULE_PATH.to_string(),
        version: revision.version.clone(),
        hash: revision.hash.clone(),
        commit_time: revision.commit_time,
        entries,
        bytes,
    })
}

struct ZipBuilder<'a> {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    prefix: String,
    options: SimpleFileOptions,
    entries: Vec<String>,
    cancel: &'a CancelToken,
}

impl<'a> ZipBuilder<'a> {
    fn new(prefix: String, modified: DateTime<Utc>, cancel: &'a CancelToken) -> Self {
        let mut options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(time) = zip_time(modified) {
            options = options.last_modified_time(time);
        }
        ZipBuilder {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            prefix,
            options,
            entries: Vec::new(),
            cancel,
        }
    }

    /// Add the blobs of `tree` under `dir`, descending into subtrees only
    /// when `recursive`.
    fn add_tree(
        &mut self,
        repo: &Repository,
        tree: &Tree<'_>,
        dir: &str,
        recursive: bool,
    ) -> Result<()> {
        for entry in tree.iter() {
            self.cancel.check()?;

            let Some(name) = entry.name() else {
                tracing::debug!("Skipping non-UTF-8 entry in {:?}", dir);
                continue;
            };
            if name.starts_with('.') || name.starts_with('_') || name == "go.mod" {
                continue;
            }
            if dir.is_empty() && name.starts_with("README") {
                continue;
            }
            let path = if dir.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dir, name)
            };

            match entry.kind() {
                Some(ObjectType::Blob) => {
                    let mode = entry.filemode();
                    if mode != BLOB_MODE && mode != EXECUTABLE_MODE {
                        tracing::debug!("Skipping {} with mode {:o}", path, mode);
                        continue;
                    }
                    let blob = repo
                        .find_blob(entry.id())
                        .map_err(|e| git_error(format!("read blob {}", path), e))?;
                    self.add_file(&path, blob.content(), mode == EXECUTABLE_MODE)?;
                }
                Some(ObjectType::Tree) => {
                    if name == "testdata" || !recursive {
                        continue;
                    }
                    let subtree = repo
                        .find_tree(entry.id())
                        .map_err(|e| git_error(format!("read tree {}", path), e))?;
                    self.add_tree(repo, &subtree, &path, recursive)?;
                }
                _ => tracing::debug!("Skipping {}", path),
            }
        }
        Ok(())
    }

    fn add_file(&mut self, path: &str, content: &[u8], executable: bool) -> Result<()> {
        let name = format!("{}{}", self.prefix, path);
        let options = self
            .options
            .unix_permissions(if executable { 0o755 } else { 0o644 });
        self.writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", name))?;
        self.writer
            .write_all(content)
            .with_context(|| format!("failed to write {} to archive", name))?;
        self.entries.push(name);
        Ok(())
    }

    fn finish(self) -> Result<(Vec<String>, Vec<u8>)> {
        let cursor = self.writer.finish().context("failed to finish archive")?;
        Ok((self.entries, cursor.into_inner()))
    }
}

/// The commit time as a zip timestamp, if representable.
fn zip_time(time: DateTime<Utc>) -> Option<zip::DateTime> {
    zip::DateTime::from_date_and_time(
        u16::try_from(time.year()).ok()?,
        time.month() as u8,
        time.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
    )
    .ok()
}
