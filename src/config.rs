//! Indexer configuration loaded from `typeindex.toml`

use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extractors::MemberFilter;
use crate::serializer::{ArtifactFormat, Compression, SerializeOptions};

/// Conventional file name looked up next to the indexed root
pub const CONFIG_FILE_NAME: &str = "typeindex.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMode {
    /// Normalize documentation on the codebase before it is written
    #[default]
    InPlace,
    /// Write the codebase exactly as extracted
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// File extensions to index, without the dot
    pub extensions: Vec<String>,

    /// Glob patterns matched against paths relative to the root
    pub ignore_patterns: Vec<String>,

    /// Files larger than this (in bytes) are skipped
    pub max_file_size: u64,

    /// Parser worker threads
    pub threads: usize,

    pub format: ArtifactFormat,
    pub compress: bool,

    /// Indent JSON output; only honoured when `compress` is off
    pub pretty: bool,

    pub optimize: OptimizeMode,

    /// Also write the identifier-keyed form next to the artifact
    pub emit_indexed: bool,

    /// When false, private methods and properties are left out of the model
    pub include_private_members: bool,

    pub include_protected_members: bool,
    pub include_internal_members: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["cs".to_string()],
            ignore_patterns: vec![
                "**/bin/**".to_string(),
                "**/obj/**".to_string(),
                "**/.git/**".to_string(),
                "**/.vs/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/packages/**".to_string(),
                "**/*.g.cs".to_string(),
                "**/*.Designer.cs".to_string(),
            ],
            max_file_size: 1024 * 1024,
            threads: num_cpus::get(),
            format: ArtifactFormat::Json,
            compress: true,
            pretty: false,
            optimize: OptimizeMode::InPlace,
            emit_indexed: false,
            include_private_members: true,
            include_protected_members: true,
            include_internal_members: true,
        }
    }
}

impl IndexerConfig {
    /// Load from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Configuration file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: IndexerConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;

        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create {}: {}", parent.display(), e))?;
            }
        }
        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.display(), e))?;

        debug!("Saved configuration to: {}", path.display());
        Ok(())
    }

    pub fn ignore_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow!("Invalid ignore pattern '{}': {}", pattern, e))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| anyhow!("Failed to build ignore patterns: {}", e))
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            format: self.format,
            compression: Compression::from_flag(self.compress),
            pretty: self.pretty,
        }
    }

    pub fn member_filter(&self) -> MemberFilter {
        MemberFilter {
            private: self.include_private_members,
            protected: self.include_protected_members,
            internal: self.include_internal_members,
        }
    }

    /// Worker count, never zero
    pub fn effective_threads(&self) -> usize {
        self.threads.max(1)
    }
}
