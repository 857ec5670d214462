//! File and tree copy/removal primitives

use dirmirror_types::{EntryKind, Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::snapshot::DirectorySnapshot;

/// Totals for a deep copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCopy {
    /// Files written
    pub files: u64,
    /// Directories created, including the root
    pub directories: u64,
    /// Bytes written
    pub bytes: u64,
}

/// Copy one file's bytes over `destination`
///
/// An existing destination is truncated and rewritten in place.
pub async fn copy_file(source: &Path, destination: &Path) -> Result<u64> {
    let bytes = fs::copy(source, destination)
        .await
        .map_err(|e| Error::io("copy", source, e))?;

    debug!(
        "Copied {} bytes: {} -> {}",
        bytes,
        source.display(),
        destination.display()
    );
    Ok(bytes)
}

/// Deep copy `source` to `destination`, creating every directory
///
/// Missing parents of `destination` are created. Walks with an explicit
/// stack so depth is bounded by heap, not call stack.
pub async fn copy_tree(source: &Path, destination: &Path) -> Result<TreeCopy> {
    let mut totals = TreeCopy::default();

    fs::create_dir_all(destination)
        .await
        .map_err(|e| Error::io("create directory", destination, e))?;
    totals.directories += 1;

    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), destination.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        let snapshot = DirectorySnapshot::read(&from).await?;
        for entry in snapshot.into_entries() {
            let child_from = from.join(&entry.name);
            let child_to = to.join(&entry.name);
            match entry.kind {
                EntryKind::Directory => {
                    fs::create_dir(&child_to)
                        .await
                        .map_err(|e| Error::io("create directory", &child_to, e))?;
                    totals.directories += 1;
                    pending.push((child_from, child_to));
                }
                EntryKind::File => {
                    totals.bytes += copy_file(&child_from, &child_to).await?;
                    totals.files += 1;
                }
            }
        }
    }

    Ok(totals)
}

/// Copy a file or a whole directory tree
pub async fn copy_entry(source: &Path, destination: &Path, kind: EntryKind) -> Result<TreeCopy> {
    match kind {
        EntryKind::Directory => copy_tree(source, destination).await,
        EntryKind::File => {
            let bytes = copy_file(source, destination).await?;
            Ok(TreeCopy {
                files: 1,
                directories: 0,
                bytes,
            })
        }
    }
}

/// Remove a file, or a directory together with everything under it
pub async fn remove_entry(path: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::Directory => fs::remove_dir_all(path)
            .await
            .map_err(|e| Error::io("remove directory", path, e))?,
        EntryKind::File => fs::remove_file(path)
            .await
            .map_err(|e| Error::io("remove file", path, e))?,
    }

    debug!("Removed {}: {}", kind, path.display());
    Ok(())
}
