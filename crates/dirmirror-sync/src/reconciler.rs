//! One-way reconciliation of a destination tree against a source tree

use crate::action::{ActionSink, SyncAction};
use crate::copy::{copy_entry, copy_file, copy_tree, remove_entry};
use crate::fingerprint::same_content;
use crate::report::SyncReport;
use crate::snapshot::{normalize_dir, DirectorySnapshot, Entry};
use dirmirror_types::{BufferSize, EntryKind, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, trace, warn};

/// Options for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Log and skip entries that fail instead of aborting the pass
    pub isolate_entry_failures: bool,
    /// Read buffer used when fingerprinting files
    pub hash_buffer_size: BufferSize,
}

impl ReconcileOptions {
    /// Enable or disable per-entry failure isolation
    pub fn isolate_entry_failures(mut self, enabled: bool) -> Self {
        self.isolate_entry_failures = enabled;
        self
    }

    /// Set the fingerprint read buffer
    pub fn hash_buffer_size(mut self, size: BufferSize) -> Self {
        self.hash_buffer_size = size;
        self
    }
}

/// Next step after merging one source entry
enum Step {
    Done,
    Descend,
}

/// One directory level being merged
struct Frame {
    source: PathBuf,
    destination: PathBuf,
    pending: std::vec::IntoIter<Entry>,
    existing: DirectorySnapshot,
}

/// Makes a destination tree mirror a source tree
pub struct Reconciler {
    options: ReconcileOptions,
    sink: Arc<dyn ActionSink>,
}

impl Reconciler {
    /// Create a reconciler with default options
    pub fn new(sink: Arc<dyn ActionSink>) -> Self {
        Self::with_options(ReconcileOptions::default(), sink)
    }

    /// Create a reconciler with custom options
    pub fn with_options(options: ReconcileOptions, sink: Arc<dyn ActionSink>) -> Self {
        Self { options, sink }
    }

    /// Options in effect
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Make `destination` match `source`
    ///
    /// A missing destination is created as a full copy. Otherwise, level by
    /// level, stale destination entries are removed first, then every source
    /// entry is copied, descended into, or compared by content. Partial
    /// progress is kept if an error stops the pass.
    pub async fn reconcile(&self, source: &Path, destination: &Path) -> Result<SyncReport> {
        let start_time = Instant::now();
        let mut report = SyncReport::new();
        let source = normalize_dir(source);
        let destination = normalize_dir(destination);

        let source_metadata = fs::metadata(&source)
            .await
            .map_err(|e| Error::io("inspect", &source, e))?;
        if !source_metadata.is_dir() {
            return Err(Error::not_a_directory(source));
        }

        match fs::metadata(&destination).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.bootstrap(&source, &destination, &mut report).await?;
                report.duration = start_time.elapsed();
                return Ok(report);
            }
            Err(e) => return Err(Error::io("inspect", &destination, e)),
            Ok(metadata) if !metadata.is_dir() => {
                return Err(Error::not_a_directory(destination));
            }
            Ok(_) => {}
        }

        // Depth-first over explicit frames: a subdirectory is finished
        // before its next sibling, matching the recursive order.
        let mut stack = vec![self.open_frame(source, destination, &mut report).await?];
        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.pending.next() else {
                stack.pop();
                continue;
            };
            let existing = frame.existing.kind_of(&entry.name);
            let source_path = frame.source.join(&entry.name);
            let destination_path = frame.destination.join(&entry.name);

            match self
                .merge_entry(&entry, existing, &source_path, &destination_path, &mut report)
                .await
            {
                Ok(Step::Done) => {}
                Ok(Step::Descend) => {
                    match self
                        .open_frame(source_path, destination_path.clone(), &mut report)
                        .await
                    {
                        Ok(child) => stack.push(child),
                        Err(error) => self.isolate(error, &destination_path, &mut report)?,
                    }
                }
                Err(error) => self.isolate(error, &destination_path, &mut report)?,
            }
        }

        report.duration = start_time.elapsed();
        debug!("Reconciled with {}", report);
        Ok(report)
    }

    async fn bootstrap(
        &self,
        source: &Path,
        destination: &Path,
        report: &mut SyncReport,
    ) -> Result<()> {
        let entries = DirectorySnapshot::read(source).await?.len();
        let totals = copy_tree(source, destination).await?;
        debug!(
            "Bootstrap copied {} files and {} directories ({} bytes)",
            totals.files, totals.directories, totals.bytes
        );
        self.emit(SyncAction::bootstrap(source, destination, entries), report);
        Ok(())
    }

    /// List both sides of a directory pair and run the deletion pass
    async fn open_frame(
        &self,
        source: PathBuf,
        destination: PathBuf,
        report: &mut SyncReport,
    ) -> Result<Frame> {
        let wanted = DirectorySnapshot::read(&source).await?;
        let existing = DirectorySnapshot::read(&destination).await?;

        for stale in existing.missing_from(&wanted) {
            let source_path = source.join(&stale.name);
            let destination_path = destination.join(&stale.name);
            match remove_entry(&destination_path, stale.kind).await {
                Ok(()) => self.emit(
                    SyncAction::removed(&source_path, &destination_path, stale.kind),
                    report,
                ),
                Err(error) => self.isolate(error, &destination_path, report)?,
            }
        }

        Ok(Frame {
            source,
            destination,
            pending: wanted.into_entries(),
            existing,
        })
    }

    async fn merge_entry(
        &self,
        entry: &Entry,
        existing: Option<EntryKind>,
        source: &Path,
        destination: &Path,
        report: &mut SyncReport,
    ) -> Result<Step> {
        match existing {
            None => {
                copy_entry(source, destination, entry.kind).await?;
                self.emit(SyncAction::copied(source, destination, entry.kind), report);
            }
            Some(kind) if kind != entry.kind => {
                remove_entry(destination, kind).await?;
                copy_entry(source, destination, entry.kind).await?;
                self.emit(SyncAction::replaced(source, destination, entry.kind), report);
            }
            Some(EntryKind::Directory) => return Ok(Step::Descend),
            Some(EntryKind::File) => {
                if same_content(source, destination, self.options.hash_buffer_size).await? {
                    trace!("Unchanged: {}", destination.display());
                    report.unchanged += 1;
                } else {
                    copy_file(source, destination).await?;
                    self.emit(SyncAction::updated(source, destination), report);
                }
            }
        }
        Ok(Step::Done)
    }

    fn emit(&self, action: SyncAction, report: &mut SyncReport) {
        report.record(action.kind);
        self.sink.record(&action);
    }

    /// Swallow a per-entry failure when isolation is enabled
    fn isolate(&self, error: Error, path: &Path, report: &mut SyncReport) -> Result<()> {
        if !self.options.isolate_entry_failures || error.is_fatal() {
            return Err(error);
        }
        warn!("Skipping '{}': {}", path.display(), error);
        report.errors += 1;
        Ok(())
    }
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, MemorySink};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        source: PathBuf,
        destination: PathBuf,
        sink: Arc<MemorySink>,
        reconciler: Reconciler,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_options(ReconcileOptions::default())
        }

        fn with_options(options: ReconcileOptions) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("source");
            let destination = temp_dir.path().join("destination");
            std::fs::create_dir(&source).unwrap();
            let sink = Arc::new(MemorySink::new());
            let reconciler = Reconciler::with_options(options, sink.clone());
            Self {
                _temp_dir: temp_dir,
                source,
                destination,
                sink,
                reconciler,
            }
        }

        fn write(&self, root: &Path, relative: &str, content: &str) {
            let path = root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        async fn sync(&self) -> SyncReport {
            self.reconciler
                .reconcile(&self.source, &self.destination)
                .await
                .unwrap()
        }
    }

    /// Relative path -> Some(content) for files, None for directories
    fn tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        let mut out = BTreeMap::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                if path.is_dir() {
                    out.insert(relative, None);
                    pending.push(path);
                } else {
                    out.insert(relative, Some(std::fs::read(&path).unwrap()));
                }
            }
        }
        out
    }

    #[tokio::test]
    async fn test_bootstrap_copies_everything_once() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "a.txt", "hi");
        fixture.write(&fixture.source, "sub/b.txt", "yo");

        let report = fixture.sync().await;

        assert!(report.bootstrapped);
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
        let actions = fixture.sink.take();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Bootstrap);
        assert_eq!(actions[0].entries, Some(2));
    }

    #[tokio::test]
    async fn test_second_run_is_silent() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "a.txt", "hi");
        fixture.write(&fixture.source, "sub/b.txt", "yo");
        fixture.sync().await;
        fixture.sink.take();

        let report = fixture.sync().await;

        assert!(report.is_noop());
        assert_eq!(report.unchanged, 2);
        assert!(fixture.sink.is_empty());
    }

    #[tokio::test]
    async fn test_changed_file_is_updated() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "a.txt", "hi");
        fixture.write(&fixture.source, "same.txt", "stable");
        fixture.sync().await;
        fixture.sink.take();

        fixture.write(&fixture.source, "a.txt", "bye");
        let report = fixture.sync().await;

        let actions = fixture.sink.take();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Updated);
        assert_eq!(actions[0].name, "a.txt");
        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(
            std::fs::read_to_string(fixture.destination.join("a.txt")).unwrap(),
            "bye"
        );
    }

    #[tokio::test]
    async fn test_stale_directory_removed_with_one_record() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "keep.txt", "k");
        fixture.sync().await;
        fixture.sink.take();

        fixture.write(&fixture.destination, "extra_dir/one.txt", "1");
        fixture.write(&fixture.destination, "extra_dir/nested/two.txt", "2");
        fixture.write(&fixture.destination, "stray.txt", "s");
        fixture.sync().await;

        let actions = fixture.sink.take();
        let removed: Vec<_> = actions
            .iter()
            .filter(|a| a.kind == ActionKind::Removed)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(removed, vec!["extra_dir", "stray.txt"]);
        assert_eq!(actions.len(), 2);
        assert!(!fixture.destination.join("extra_dir").exists());
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_new_entries_copied_in_name_order() {
        let fixture = Fixture::new();
        std::fs::create_dir(&fixture.destination).unwrap();
        fixture.write(&fixture.source, "c.txt", "c");
        fixture.write(&fixture.source, "a.txt", "a");
        fixture.write(&fixture.source, "b/inner.txt", "b");

        let report = fixture.sync().await;

        let names: Vec<_> = fixture.sink.take().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a.txt", "b", "c.txt"]);
        assert_eq!(report.copied, 3);
        assert!(!report.bootstrapped);
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_nested_changes_follow_depth_first_order() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "a/deep/x.txt", "x");
        fixture.write(&fixture.source, "b.txt", "b");
        fixture.sync().await;
        fixture.sink.take();

        fixture.write(&fixture.source, "a/deep/x.txt", "x2");
        fixture.write(&fixture.source, "a/new.txt", "n");
        fixture.write(&fixture.source, "b.txt", "b2");
        fixture.sync().await;

        let names: Vec<_> = fixture
            .sink
            .take()
            .into_iter()
            .map(|a| (a.kind, a.name))
            .collect();
        assert_eq!(
            names,
            vec![
                (ActionKind::Updated, "x.txt".to_string()),
                (ActionKind::Copied, "new.txt".to_string()),
                (ActionKind::Updated, "b.txt".to_string()),
            ]
        );
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_file_replaced_by_directory() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "thing", "file");
        fixture.sync().await;
        fixture.sink.take();

        std::fs::remove_file(fixture.source.join("thing")).unwrap();
        fixture.write(&fixture.source, "thing/inside.txt", "now a dir");
        let report = fixture.sync().await;

        let actions = fixture.sink.take();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Replaced);
        assert_eq!(actions[0].entry_kind, EntryKind::Directory);
        assert_eq!(report.replaced, 1);
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_directory_replaced_by_file() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "thing/inside.txt", "dir");
        fixture.sync().await;
        fixture.sink.take();

        std::fs::remove_dir_all(fixture.source.join("thing")).unwrap();
        fixture.write(&fixture.source, "thing", "file now");
        fixture.sync().await;

        let actions = fixture.sink.take();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Replaced);
        assert_eq!(actions[0].entry_kind, EntryKind::File);
        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_trailing_separator_is_ignored() {
        let fixture = Fixture::new();
        fixture.write(&fixture.source, "a.txt", "hi");

        let source = format!("{}/", fixture.source.display());
        let destination = format!("{}/", fixture.destination.display());
        fixture
            .reconciler
            .reconcile(Path::new(&source), Path::new(&destination))
            .await
            .unwrap();

        assert_eq!(tree(&fixture.source), tree(&fixture.destination));
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let fixture = Fixture::new();
        std::fs::remove_dir(&fixture.source).unwrap();

        let error = fixture
            .reconciler
            .reconcile(&fixture.source, &fixture.destination)
            .await
            .unwrap_err();

        assert!(matches!(error, Error::FileNotFound { .. }));
        assert!(!fixture.destination.exists());
    }

    #[tokio::test]
    async fn test_destination_file_is_rejected() {
        let fixture = Fixture::new();
        std::fs::write(&fixture.destination, "not a dir").unwrap();

        let error = fixture
            .reconciler
            .reconcile(&fixture.source, &fixture.destination)
            .await
            .unwrap_err();

        assert!(matches!(error, Error::NotADirectory { .. }));
    }

    #[cfg(unix)]
    fn add_broken_entry(fixture: &Fixture) {
        std::os::unix::fs::symlink(
            fixture.source.join("nowhere"),
            fixture.source.join("broken"),
        )
        .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_entry_failure_aborts_pass_by_default() {
        let fixture = Fixture::new();
        std::fs::create_dir(&fixture.destination).unwrap();
        fixture.write(&fixture.source, "a.txt", "a");
        add_broken_entry(&fixture);
        fixture.write(&fixture.source, "c.txt", "c");

        let result = fixture
            .reconciler
            .reconcile(&fixture.source, &fixture.destination)
            .await;

        assert!(result.is_err());
        // "a.txt" sorts before "broken" and was already copied
        assert!(fixture.destination.join("a.txt").exists());
        assert!(!fixture.destination.join("c.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_entry_failure_isolated_when_enabled() {
        let fixture =
            Fixture::with_options(ReconcileOptions::default().isolate_entry_failures(true));
        std::fs::create_dir(&fixture.destination).unwrap();
        fixture.write(&fixture.source, "a.txt", "a");
        add_broken_entry(&fixture);
        fixture.write(&fixture.source, "c.txt", "c");

        let report = fixture.sync().await;

        assert_eq!(report.errors, 1);
        assert_eq!(report.copied, 2);
        assert!(fixture.destination.join("c.txt").exists());
    }
}
