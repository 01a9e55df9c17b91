//! File discovery
//!
//! Walks the root in file-name order so the file list, and everything built
//! from it, is the same on every run over the same tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{IndexIssue, IssueKind};
use crate::extractors::ExtractorManager;

/// Directories never worth descending into
pub const BLACKLISTED_DIRECTORIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".vs",
    ".vscode",
    ".idea",
    "bin",
    "obj",
    "node_modules",
    "packages",
    "TestResults",
];

#[derive(Debug, Default)]
pub struct Discovery {
    /// Eligible files in enumeration order
    pub files: Vec<PathBuf>,
    pub issues: Vec<IndexIssue>,
}

fn is_blacklisted(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| BLACKLISTED_DIRECTORIES.contains(&name))
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// One step of a directory walk as discovery sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    File(PathBuf),
    /// A path the walk could not read; its subtree is skipped
    Unreadable { path: PathBuf, reason: String },
}

/// Produces the walk of a root; swapped out in tests
pub type WalkSource = Arc<dyn Fn(&Path) -> Vec<WalkEntry> + Send + Sync>;

/// Walk `root` in file-name order, pruning blacklisted directories
pub fn walk_tree(root: &Path) -> Vec<WalkEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_blacklisted(e))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(WalkEntry::File(entry.into_path())),
            Ok(_) => None,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                Some(WalkEntry::Unreadable {
                    path,
                    reason: err.to_string(),
                })
            }
        })
        .collect()
}

/// Enumerate every file under `root` that a registered parser accepts
pub fn discover_files(
    root: &Path,
    extensions: &[String],
    ignore: &GlobSet,
    extractors: &ExtractorManager,
) -> Discovery {
    collect_files(root, walk_tree(root), extensions, ignore, extractors)
}

/// Sort walk entries into eligible files and issues
///
/// An empty `extensions` list leaves the choice to the parsers alone. An
/// unreadable path is recorded as an issue and skipped; its siblings are still
/// used. Eligible files whose path is not valid UTF-8 cannot be stored in an
/// artifact and are reported instead of kept.
pub fn collect_files(
    root: &Path,
    entries: impl IntoIterator<Item = WalkEntry>,
    extensions: &[String],
    ignore: &GlobSet,
    extractors: &ExtractorManager,
) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in entries {
        let path = match entry {
            WalkEntry::File(path) => path,
            WalkEntry::Unreadable { path, reason } => {
                warn!("Skipping unreadable path {}: {}", path.display(), reason);
                discovery
                    .issues
                    .push(IndexIssue::new(IssueKind::DirectoryAccess, path, reason));
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(&path);
        if ignore.is_match(relative) {
            debug!("Ignoring {}", relative.display());
            continue;
        }
        if !has_allowed_extension(&path, extensions) || extractors.parser_for(&path).is_none() {
            continue;
        }
        if path.to_str().is_none() {
            warn!("Skipping {}: path is not valid UTF-8", path.display());
            discovery.issues.push(IndexIssue::new(
                IssueKind::FileRead,
                &path,
                "path is not valid UTF-8",
            ));
            continue;
        }
        discovery.files.push(path);
    }

    debug!(
        "Discovered {} files ({} skipped paths)",
        discovery.files.len(),
        discovery.issues.len()
    );
    discovery
}
