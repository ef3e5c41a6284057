//! Read-only filesystem view over a module archive.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::util::errors::Error;

/// An entry listed by [`ContentDir::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Module content with the `<module>@<version>/` prefix stripped.
///
/// Paths are `/`-separated and relative; the empty path is the root.
#[derive(Debug, Clone, Default)]
pub struct ContentDir {
    files: BTreeMap<String, Vec<u8>>,
}

impl ContentDir {
    pub(crate) fn new(files: BTreeMap<String, Vec<u8>>) -> Self {
        ContentDir { files }
    }

    /// Contents of the file at `path`.
    pub fn read(&self, path: &str) -> Result<&[u8]> {
        self.files
            .get(normalize(path))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::not_found(format!("read({:?}): no such file", path)).into())
    }

    /// Immediate children of the directory at `path`, sorted by name.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let dir = normalize(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut entries: BTreeMap<&str, bool> = BTreeMap::new();
        for file in self.files.keys() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    entries.insert(child, true);
                }
                None => {
                    entries.entry(rest).or_insert(false);
                }
            }
        }

        if entries.is_empty() && !dir.is_empty() {
            return Err(Error::not_found(format!("read_dir({:?}): no such directory", path)).into());
        }
        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| DirEntry {
                name: name.to_string(),
                is_dir,
            })
            .collect())
    }

    /// Whether `path` names a file or a non-empty directory.
    pub fn exists(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() || self.files.contains_key(path) {
            return true;
        }
        let prefix = format!("{}/", path);
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(name, _)| name.starts_with(&prefix))
    }

    /// Every file path, in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}
