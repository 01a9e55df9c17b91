//! Single-file processing run on parser workers
//!
//! Workers only read files and call the parser. They never touch the
//! aggregate; results flow back to the orchestrator in enumeration order.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{IndexIssue, IssueKind};
use crate::extractors::ExtractorManager;
use crate::model::SourceFile;
use crate::utils::paths::{to_relative_unix_style, to_unix_style};

pub fn process_file(
    path: &Path,
    root: &Path,
    max_file_size: u64,
    extractors: &ExtractorManager,
) -> Result<SourceFile, IndexIssue> {
    let metadata = fs::metadata(path)
        .map_err(|e| IndexIssue::new(IssueKind::FileRead, path, e.to_string()))?;

    if metadata.len() > max_file_size {
        debug!("Skipping large file {} ({} bytes)", path.display(), metadata.len());
        return Err(IndexIssue::new(
            IssueKind::TooLarge,
            path,
            format!("{} bytes exceeds limit of {}", metadata.len(), max_file_size),
        ));
    }

    let bytes =
        fs::read(path).map_err(|e| IndexIssue::new(IssueKind::FileRead, path, e.to_string()))?;
    let source = String::from_utf8_lossy(&bytes);

    let mut file = extractors.parse(path, &source).map_err(|e| {
        warn!("Failed to parse {}: {}", path.display(), e);
        IndexIssue::new(IssueKind::Parse, path, e.to_string())
    })?;

    file.absolute_path = path.to_path_buf();
    file.relative_path = to_relative_unix_style(path, root).unwrap_or_else(|_| to_unix_style(path));
    file.size = metadata.len();
    file.last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Ok(file)
}
