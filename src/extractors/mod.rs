// Parser collaborators
//
// A parser turns one file's text into a `SourceFile`. The indexer only knows
// the `LanguageParser` trait; the bundled implementation is the tree-sitter
// based C# parser.

pub mod base;
pub mod csharp;

pub use csharp::{CSharpParser, MemberFilter};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::model::SourceFile;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to load {language} grammar: {reason}")]
    Grammar {
        language: &'static str,
        reason: String,
    },

    #[error("Parser produced no syntax tree for {path}")]
    NoTree { path: PathBuf },

    #[error("Unrecoverable syntax in {path}: {reason}")]
    Syntax { path: PathBuf, reason: String },

    #[error("No parser accepts {path}")]
    Unsupported { path: PathBuf },
}

/// Turns source text into the entity model for one file
///
/// Implementations are shared across parser worker threads. They fill in
/// namespaces, imports and types; the indexer stamps the relative path, size
/// and modification time afterwards.
pub trait LanguageParser: Send + Sync {
    /// Language tag written into every `SourceFile` this parser produces
    fn language(&self) -> &'static str;

    /// Extension without the dot, compared case-insensitively
    fn can_parse_extension(&self, extension: &str) -> bool;

    fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError>;
}

/// The set of parsers available to one indexing run
#[derive(Clone)]
pub struct ExtractorManager {
    parsers: Vec<Arc<dyn LanguageParser>>,
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::with_parsers(vec![Arc::new(CSharpParser::new())])
    }
}

impl ExtractorManager {
    /// Manager with the bundled parsers
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parsers(parsers: Vec<Arc<dyn LanguageParser>>) -> Self {
        Self { parsers }
    }

    pub fn register(&mut self, parser: Arc<dyn LanguageParser>) {
        self.parsers.push(parser);
    }

    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.language()).collect()
    }

    /// First registered parser that accepts the file's extension
    pub fn parser_for(&self, path: &Path) -> Option<&Arc<dyn LanguageParser>> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.parsers
            .iter()
            .find(|p| p.can_parse_extension(&extension))
    }

    pub fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError> {
        let parser = self.parser_for(path).ok_or_else(|| ParseError::Unsupported {
            path: path.to_path_buf(),
        })?;
        let file = parser.parse(path, source)?;

        tracing::debug!(
            "Extracted {} types from {} file: {}",
            file.types.len(),
            parser.language(),
            path.display()
        );
        Ok(file)
    }
}
