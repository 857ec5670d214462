//! Fixtures for building directory trees and checking that two trees match

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One node of a tree listing: file bytes, or `None` for a directory
pub type TreeListing = BTreeMap<PathBuf, Option<Vec<u8>>>;

/// Deterministic file content with some structure
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect()
}

/// Declarative description of a directory tree
#[derive(Debug, Clone, Default)]
pub struct TreeSpec {
    nodes: Vec<(PathBuf, Option<Vec<u8>>)>,
}

impl TreeSpec {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; missing parent directories are implied
    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.nodes
            .push((PathBuf::from(path), Some(content.as_ref().to_vec())));
        self
    }

    /// Add a directory, possibly empty
    pub fn dir(mut self, path: &str) -> Self {
        self.nodes.push((PathBuf::from(path), None));
        self
    }

    /// Add `count` files of `size` bytes spread over `dirs` subdirectories
    pub fn bulk(mut self, dirs: usize, count: usize, size: usize) -> Self {
        for i in 0..count {
            let path = format!("d{:03}/f{:05}.dat", i % dirs.max(1), i);
            let mut content = generate_test_data(size);
            if let Some(first) = content.first_mut() {
                *first = (i % 256) as u8;
            }
            self.nodes.push((PathBuf::from(path), Some(content)));
        }
        self
    }

    /// Write the tree under `root`, creating `root` itself
    pub fn write(&self, root: &Path) -> std::io::Result<()> {
        fs::create_dir_all(root)?;
        for (path, content) in &self.nodes {
            let full_path = root.join(path);
            match content {
                Some(bytes) => {
                    if let Some(parent) = full_path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&full_path, bytes)?;
                }
                None => fs::create_dir_all(&full_path)?,
            }
        }
        Ok(())
    }
}

/// Every entry under `root`, keyed by path relative to `root`
pub fn list_tree(root: &Path) -> std::io::Result<TreeListing> {
    let mut listing = TreeListing::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        for entry in fs::read_dir(root.join(&relative))? {
            let entry = entry?;
            let child = relative.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                listing.insert(child.clone(), None);
                pending.push(child);
            } else {
                listing.insert(child, Some(fs::read(entry.path())?));
            }
        }
    }

    Ok(listing)
}

/// Assert that `destination` holds exactly the entries and bytes of `source`
pub fn assert_mirrored(source: &Path, destination: &Path) {
    let expected = list_tree(source).expect("Failed to list source tree");
    let actual = list_tree(destination).expect("Failed to list destination tree");

    let expected_names: Vec<_> = expected.keys().collect();
    let actual_names: Vec<_> = actual.keys().collect();
    assert_eq!(actual_names, expected_names, "entry sets differ");

    for (path, content) in &expected {
        assert_eq!(
            actual.get(path),
            Some(content),
            "content differs at {}",
            path.display()
        );
    }
}
