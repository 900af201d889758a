use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;
use tracing::debug;

use crate::error::FsError;
use crate::path::DirPath;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirEntry {
    direct_file_size: u64,
    children: BTreeSet<DirPath>,
}

impl DirEntry {
    /// Sum of the files listed directly in this directory.
    pub fn direct_file_size(&self) -> u64 {
        self.direct_file_size
    }

    pub fn children(&self) -> &BTreeSet<DirPath> {
        &self.children
    }
}

/// Every directory discovered so far, keyed by its canonical path.
///
/// Entries are created on first reference: registering a child, adding a
/// file size or calling [`DirectoryTree::ensure_exists`] all create the
/// directory if it is not known yet. Nothing is ever removed.
#[derive(Debug, Default, Clone)]
pub struct DirectoryTree {
    entries: BTreeMap<DirPath, DirEntry>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_exists(&mut self, path: &DirPath) -> &mut DirEntry {
        if !self.entries.contains_key(path) {
            debug!("new directory {path}");
        }
        self.entries.entry(path.clone()).or_default()
    }

    pub fn register_child(&mut self, parent: &DirPath, child: &DirPath) {
        self.ensure_exists(child);
        self.ensure_exists(parent).children.insert(child.clone());
    }

    pub fn add_file_size(&mut self, dir: &DirPath, size: i64) -> Result<(), FsError> {
        let size = u64::try_from(size).map_err(|_| FsError::InvalidSize(size))?;
        let entry = self.ensure_exists(dir);
        entry.direct_file_size = entry
            .direct_file_size
            .checked_add(size)
            .ok_or_else(|| FsError::SizeOverflow { path: dir.clone() })?;
        Ok(())
    }

    pub fn get(&self, path: &DirPath) -> Option<&DirEntry> {
        self.entries.get(path)
    }

    pub fn total_size(&self, path: &DirPath) -> Result<u64, FsError> {
        let entry = self
            .get(path)
            .ok_or_else(|| FsError::UnknownPath(path.clone()))?;

        entry
            .children
            .iter()
            .try_fold(entry.direct_file_size, |acc, c| {
                acc.checked_add(self.total_size(c)?)
                    .ok_or_else(|| FsError::SizeOverflow { path: path.clone() })
            })
    }

    pub fn all_paths(&self) -> impl Iterator<Item = &DirPath> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of every directory, each subtree visited once.
    pub fn sizes(&self) -> Result<BTreeMap<DirPath, u64>, FsError> {
        let mut sizes = BTreeMap::new();
        for path in self.all_paths() {
            self.fill_size(path, &mut sizes)?;
        }
        Ok(sizes)
    }

    fn fill_size(&self, path: &DirPath, sizes: &mut BTreeMap<DirPath, u64>) -> Result<u64, FsError> {
        if let Some(&size) = sizes.get(path) {
            return Ok(size);
        }

        let entry = self
            .get(path)
            .ok_or_else(|| FsError::UnknownPath(path.clone()))?;

        let mut size = entry.direct_file_size;
        for child in entry.children.iter() {
            size = size
                .checked_add(self.fill_size(child, sizes)?)
                .ok_or_else(|| FsError::SizeOverflow { path: path.clone() })?;
        }

        sizes.insert(path.clone(), size);
        Ok(size)
    }

    fn fmt_subtree(
        &self,
        f: &mut fmt::Formatter<'_>,
        path: &DirPath,
        sizes: &BTreeMap<DirPath, u64>,
        indent: usize,
    ) -> fmt::Result {
        let entry = self.get(path).ok_or(fmt::Error)?;
        let total = sizes.get(path).ok_or(fmt::Error)?;
        writeln!(
            f,
            "{:indent$}- {} (direct={}, total={total})",
            "",
            path.name(),
            entry.direct_file_size,
            indent = indent * 2,
        )?;

        entry
            .children
            .iter()
            .try_for_each(|child| self.fmt_subtree(f, child, sizes, indent + 1))
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = self.sizes().map_err(|_| fmt::Error)?;

        // Anything not reachable from the root still gets printed as its own tree.
        let tops = self
            .all_paths()
            .filter(|p| match p.parent() {
                Some(parent) => !self
                    .get(&parent)
                    .is_some_and(|e| e.children.contains(*p)),
                None => true,
            })
            .sorted_by_key(|p| (!p.is_root(), p.depth()))
            .collect::<Vec<_>>();

        tops.into_iter()
            .try_for_each(|top| self.fmt_subtree(f, top, &sizes, 0))
    }
}
