// typeindex - structural index builder for C# source trees
//!
//! Extracts types, members, signatures and relationships from a source tree
//! and writes them as a compact, deduplicated artifact for token-limited
//! consumers. The pipeline is extraction ([`extractors`]) into the entity
//! model ([`model`]), token optimization ([`optimizer`]) and serialization
//! ([`serializer`]), driven end to end by [`indexing::Indexer`].

pub mod config;
pub mod extractors;
pub mod indexing;
pub mod model;
pub mod optimizer;
pub mod serializer;
pub mod utils;


// Re-export common types
pub use config::IndexerConfig;
pub use extractors::{CSharpParser, ExtractorManager, LanguageParser, MemberFilter, ParseError};
pub use indexing::{IndexError, IndexReport, Indexer, IndexingState, RunOutcome};
pub use model::{Codebase, SourceFile, TypeEntity, TypeKind};
pub use optimizer::{IndexedCodebase, StringInterner, TokenOptimizer};
pub use serializer::{ArtifactFormat, Compression, SerializeError, SerializeOptions};
