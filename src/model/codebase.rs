use super::{SourceFile, TypeEntity, TypeKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A structural invariant of the entity graph does not hold
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{location}: {reason}")]
pub struct InvalidEntity {
    pub location: String,
    pub reason: String,
}

/// Root aggregate of one indexing run
///
/// Owns every file (and through them every type). Counts are computed from
/// the live sequences on every call; nothing derived is cached except the
/// namespace set, which [`Codebase::push_file`] keeps in step with the files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Codebase {
    pub root: PathBuf,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub namespaces: BTreeSet<String>,
}

impl Codebase {
    /// Empty codebase stamped with the current time
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            created_at: Utc::now(),
            files: Vec::new(),
            namespaces: BTreeSet::new(),
        }
    }

    pub fn from_files(root: impl Into<PathBuf>, files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut codebase = Self::new(root);
        for file in files {
            codebase.push_file(file);
        }
        codebase
    }

    /// Append a file and record every namespace it declares or places types in
    pub fn push_file(&mut self, file: SourceFile) {
        for ns in &file.namespaces {
            if !ns.is_empty() {
                self.namespaces.insert(ns.clone());
            }
        }
        for ty in &file.types {
            if !ty.namespace.is_empty() {
                self.namespaces.insert(ty.namespace.clone());
            }
        }
        self.files.push(file);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flat view over every type in file order
    pub fn all_types(&self) -> impl Iterator<Item = &TypeEntity> {
        self.files.iter().flat_map(|f| f.types.iter())
    }

    pub fn all_types_mut(&mut self) -> impl Iterator<Item = &mut TypeEntity> {
        self.files.iter_mut().flat_map(|f| f.types.iter_mut())
    }

    pub fn find_type(&self, fully_qualified_name: &str) -> Option<&TypeEntity> {
        self.all_types()
            .find(|t| t.fully_qualified_name() == fully_qualified_name)
    }

    pub fn total_file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_type_count(&self) -> usize {
        self.files.iter().map(|f| f.types.len()).sum()
    }

    fn count_kind(&self, kind: TypeKind) -> usize {
        self.all_types().filter(|t| t.kind == kind).count()
    }

    pub fn total_class_count(&self) -> usize {
        self.count_kind(TypeKind::Class)
    }

    pub fn total_interface_count(&self) -> usize {
        self.count_kind(TypeKind::Interface)
    }

    pub fn total_struct_count(&self) -> usize {
        self.count_kind(TypeKind::Struct)
    }

    pub fn total_enum_count(&self) -> usize {
        self.count_kind(TypeKind::Enum)
    }

    pub fn total_method_count(&self) -> usize {
        self.all_types().map(|t| t.methods.len()).sum()
    }

    pub fn total_property_count(&self) -> usize {
        self.all_types().map(|t| t.properties.len()).sum()
    }

    /// Number of files per language tag
    pub fn language_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for file in &self.files {
            *distribution.entry(file.language.clone()).or_insert(0) += 1;
        }
        distribution
    }

    /// Check the structural invariants of every type
    ///
    /// Types need a name, and a nested type needs a non-empty parent name.
    pub fn validate(&self) -> Result<(), InvalidEntity> {
        for file in &self.files {
            for ty in &file.types {
                let location = format!("{}::{}", file.display_path(), ty.fully_qualified_name());
                if ty.name.trim().is_empty() {
                    return Err(InvalidEntity {
                        location,
                        reason: "type has an empty name".to_string(),
                    });
                }
                if let Some(parent) = &ty.parent_type {
                    if parent.trim().is_empty() {
                        return Err(InvalidEntity {
                            location,
                            reason: "nested type has an empty parent type name".to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> CodebaseSummary {
        CodebaseSummary {
            root: self.root.clone(),
            created_at: self.created_at,
            files: self.total_file_count(),
            namespaces: self.namespaces.len(),
            types: self.total_type_count(),
            classes: self.total_class_count(),
            interfaces: self.total_interface_count(),
            structs: self.total_struct_count(),
            enums: self.total_enum_count(),
            methods: self.total_method_count(),
            properties: self.total_property_count(),
            languages: self.language_distribution(),
        }
    }
}

/// Point-in-time counts for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodebaseSummary {
    pub root: PathBuf,
    pub created_at: DateTime<Utc>,
    pub files: usize,
    pub namespaces: usize,
    pub types: usize,
    pub classes: usize,
    pub interfaces: usize,
    pub structs: usize,
    pub enums: usize,
    pub methods: usize,
    pub properties: usize,
    pub languages: BTreeMap<String, usize>,
}
