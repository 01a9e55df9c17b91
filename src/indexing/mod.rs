//! Indexing orchestrator
//!
//! Drives one run from a root directory to a written artifact:
//!
//! ```text
//! Idle -> Scanning -> Parsing -> Optimizing -> Serializing -> Done
//!            |           |           |              |
//!            +-----------+-----------+--------------+--> Cancelled
//!            +--> Failed (root inaccessible)
//! ```
//!
//! Parsing fans out over a bounded rayon pool. Results are collected back in
//! enumeration order, so the same tree always produces the same artifact.
//! Cancellation is checked between files; a cancelled run writes nothing.

pub mod discovery;
pub mod processor;
pub mod progress;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use discovery::{WalkEntry, WalkSource};

use crate::config::{IndexerConfig, OptimizeMode};
use crate::extractors::{CSharpParser, ExtractorManager};
use crate::model::{Codebase, CodebaseSummary, SourceFile};
use crate::optimizer::{InPlaceReport, OptimizeError, StringInterner, TokenOptimizer};
use crate::serializer::{self, SerializeError};
use crate::utils::token_estimation::TokenEstimator;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Root directory {path} is not accessible: {source}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Optimization failed: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build parser thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexingState {
    #[default]
    Idle,
    Scanning,
    Parsing,
    Optimizing,
    Serializing,
    Done,
    Cancelled,
    Failed,
}

impl IndexingState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IndexingState::Done | IndexingState::Cancelled | IndexingState::Failed
        )
    }
}

/// Shared cancellation signal; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A directory below the root could not be read
    DirectoryAccess,
    FileRead,
    TooLarge,
    Parse,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::DirectoryAccess => "directory access",
            IssueKind::FileRead => "file read",
            IssueKind::TooLarge => "too large",
            IssueKind::Parse => "parse",
        }
    }
}

/// A recoverable per-item problem; the run carries on without the item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexIssue {
    pub kind: IssueKind,
    pub path: PathBuf,
    pub message: String,
}

impl IndexIssue {
    pub fn new(kind: IssueKind, path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.path.display(), self.message)
    }
}

#[derive(Debug, Clone)]
pub struct IndexReport {
    pub output: PathBuf,
    pub indexed_output: Option<PathBuf>,
    pub files_discovered: usize,
    pub files_indexed: usize,
    pub issues: Vec<IndexIssue>,
    pub duration: Duration,
    /// Estimated tokens of the extracted graph as JSON text
    pub tokens_before: usize,
    /// Estimated tokens of the written graph as JSON text
    pub tokens_after: usize,
    /// Size of the JSON text before format conversion and compression
    pub raw_size: u64,
    /// Size of the artifact on disk
    pub final_size: u64,
    pub in_place: Option<InPlaceReport>,
    pub summary: CodebaseSummary,
}

impl IndexReport {
    /// `raw_size / final_size`; 1.0 when nothing was written
    pub fn compression_ratio(&self) -> f64 {
        if self.final_size == 0 {
            1.0
        } else {
            self.raw_size as f64 / self.final_size as f64
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(IndexReport),
    /// Nothing was written; `files_parsed` counts work that was thrown away
    Cancelled { files_parsed: usize },
}

/// Called with `(processed, total)` after each parsed file
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub struct Indexer {
    config: IndexerConfig,
    extractors: ExtractorManager,
    optimizer: TokenOptimizer,
    cancel: CancellationFlag,
    progress: Option<ProgressCallback>,
    walker: WalkSource,
    state: IndexingState,
}

impl Indexer {
    /// Indexer with the bundled parsers configured from `config`
    pub fn new(config: IndexerConfig) -> Self {
        let extractors = ExtractorManager::with_parsers(vec![Arc::new(
            CSharpParser::with_member_filter(config.member_filter()),
        )]);
        Self::with_extractors(config, extractors)
    }

    pub fn with_extractors(config: IndexerConfig, extractors: ExtractorManager) -> Self {
        Self {
            config,
            extractors,
            optimizer: TokenOptimizer::new(),
            cancel: CancellationFlag::new(),
            progress: None,
            walker: Arc::new(discovery::walk_tree),
            state: IndexingState::Idle,
        }
    }

    /// Share an existing flag instead of the indexer's own
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Replace how the root is walked
    pub fn with_walker(mut self, walker: WalkSource) -> Self {
        self.walker = walker;
        self
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn state(&self) -> IndexingState {
        self.state
    }

    /// Handle for cancelling a run from another thread
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    fn transition(&mut self, next: IndexingState) {
        debug!("Indexer state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn cancelled(&mut self, files_parsed: usize) -> Result<RunOutcome> {
        info!("Indexing cancelled, discarding {} parsed files", files_parsed);
        self.transition(IndexingState::Cancelled);
        Ok(RunOutcome::Cancelled { files_parsed })
    }

    /// Index `root` and write the artifact to `output`
    ///
    /// Taking `&mut self` keeps runs on one indexer strictly sequential. A
    /// cancellation requested before the call is honoured immediately; the flag
    /// is cleared when the run ends.
    pub fn run(&mut self, root: &Path, output: &Path) -> Result<RunOutcome> {
        let outcome = self.run_inner(root, output);
        if outcome.is_err() && !self.state.is_terminal() {
            self.transition(IndexingState::Failed);
        }
        self.cancel.reset();
        outcome
    }

    fn run_inner(&mut self, root: &Path, output: &Path) -> Result<RunOutcome> {
        let started = Instant::now();
        self.transition(IndexingState::Scanning);

        let root = check_root(root)?;
        info!("Indexing {}", root.display());

        let ignore = self
            .config
            .ignore_set()
            .map_err(|e| IndexError::Config(e.to_string()))?;
        let discovery = discovery::collect_files(
            &root,
            (self.walker)(&root),
            &self.config.extensions,
            &ignore,
            &self.extractors,
        );
        let mut issues = discovery.issues;
        let files_discovered = discovery.files.len();
        if self.cancel.is_cancelled() {
            return self.cancelled(0);
        }

        self.transition(IndexingState::Parsing);
        let results = self.parse_all(&root, &discovery.files)?;
        let files_parsed = results.iter().filter(|r| matches!(r, Some(Ok(_)))).count();
        if self.cancel.is_cancelled() {
            return self.cancelled(files_parsed);
        }

        let mut codebase = Codebase::new(&root);
        for result in results.into_iter().flatten() {
            match result {
                Ok(file) => codebase.push_file(file),
                Err(issue) => issues.push(issue),
            }
        }
        info!(
            "Parsed {} of {} files ({} issues)",
            codebase.total_file_count(),
            files_discovered,
            issues.len()
        );

        self.transition(IndexingState::Optimizing);
        let estimator = TokenEstimator::new();
        let extracted_text = serde_json::to_vec(&codebase).map_err(SerializeError::from)?;
        let tokens_before = estimator.estimate_bytes(&extracted_text);
        let in_place = match self.config.optimize {
            OptimizeMode::InPlace => {
                let report = self.optimizer.optimize_in_place(&mut codebase)?;
                for fault in &report.faults {
                    warn!("Left {} unoptimized after a fault", fault);
                }
                Some(report)
            }
            OptimizeMode::None => None,
        };
        if self.cancel.is_cancelled() {
            return self.cancelled(files_parsed);
        }

        self.transition(IndexingState::Serializing);
        let text = serde_json::to_vec(&codebase).map_err(SerializeError::from)?;
        let tokens_after = estimator.estimate_bytes(&text);

        // Encode everything before touching the disk
        let options = self.config.serialize_options();
        let artifact = serializer::serialize(&codebase, &options)?;
        let indexed = if self.config.emit_indexed {
            let mut interner = StringInterner::new();
            let indexed = self.optimizer.optimize(&codebase, &mut interner)?;
            Some((indexed_path(output), serializer::serialize(&indexed, &options)?))
        } else {
            None
        };

        ensure_parent_dir(output)?;
        let final_size = serializer::write_artifact(output, &artifact)?;
        let indexed_output = match indexed {
            Some((path, bytes)) => {
                if let Err(e) = serializer::write_artifact(&path, &bytes) {
                    // Never leave the main artifact behind without its indexed form
                    if let Err(remove) = fs::remove_file(output) {
                        warn!("Could not remove {}: {}", output.display(), remove);
                    }
                    return Err(e.into());
                }
                Some(path)
            }
            None => None,
        };

        self.transition(IndexingState::Done);
        let report = IndexReport {
            output: output.to_path_buf(),
            indexed_output,
            files_discovered,
            files_indexed: codebase.total_file_count(),
            issues,
            duration: started.elapsed(),
            tokens_before,
            tokens_after,
            raw_size: text.len() as u64,
            final_size,
            in_place,
            summary: codebase.summary(),
        };
        info!(
            "Indexed {} files in {}ms, {} -> {} bytes",
            report.files_indexed,
            report.duration.as_millis(),
            report.raw_size,
            report.final_size
        );
        Ok(RunOutcome::Completed(report))
    }

    /// Parse every file on a bounded pool, in enumeration order
    ///
    /// `None` marks a file skipped because the run was cancelled.
    fn parse_all(
        &self,
        root: &Path,
        files: &[PathBuf],
    ) -> Result<Vec<Option<std::result::Result<SourceFile, IndexIssue>>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_threads())
            .build()
            .map_err(|e| IndexError::ThreadPool(e.to_string()))?;

        let total = files.len();
        let processed = AtomicUsize::new(0);
        let extractors = &self.extractors;
        let cancel = &self.cancel;
        let progress = self.progress.as_ref();
        let max_file_size = self.config.max_file_size;

        Ok(pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let result = processor::process_file(path, root, max_file_size, extractors);
                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = progress {
                        callback(done, total);
                    }
                    Some(result)
                })
                .collect()
        }))
    }
}

fn check_root(root: &Path) -> Result<PathBuf> {
    let inaccessible = |source| IndexError::RootInaccessible {
        path: root.to_path_buf(),
        source,
    };
    let canonical = root.canonicalize().map_err(inaccessible)?;
    fs::read_dir(&canonical).map_err(inaccessible)?;
    if canonical.to_str().is_none() {
        return Err(inaccessible(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "path is not valid UTF-8",
        )));
    }
    Ok(canonical)
}

fn ensure_parent_dir(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IndexError::OutputDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// `out/index.json` -> `out/index.indexed.json`
pub fn indexed_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    let file_name = match output.extension() {
        Some(ext) => format!("{}.indexed.{}", stem, ext.to_string_lossy()),
        None => format!("{}.indexed", stem),
    };
    output.with_file_name(file_name)
}
