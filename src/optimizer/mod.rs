//! Token optimization
//!
//! Shrinks an extracted [`Codebase`] for token-limited consumers. Two entry
//! points:
//!
//! - [`TokenOptimizer::optimize`] is a pure transform that leaves the input
//!   untouched and returns an [`IndexedCodebase`] plus its string table.
//! - [`TokenOptimizer::optimize_in_place`] rewrites documentation text on the
//!   live graph and nothing else. Running it twice changes nothing the second
//!   time.

pub mod docs;
pub mod indexed;
pub mod interner;
pub mod signature;

pub use docs::normalize_documentation;
pub use indexed::{
    IndexedCodebase, IndexedFile, IndexedMethod, IndexedParameter, IndexedProperty,
    IndexedRelationship, IndexedType,
};
pub use interner::StringInterner;
pub use signature::compact_signature;

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::model::{Codebase, InvalidEntity, Method, Parameter, Property, SourceFile, TypeEntity};

/// Value of [`IndexedCodebase::optimization_level`] written by this optimizer
pub const OPTIMIZATION_LEVEL: &str = "interned-v1";

#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The input graph breaks a structural invariant; nothing was changed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<InvalidEntity> for OptimizeError {
    fn from(err: InvalidEntity) -> Self {
        OptimizeError::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;

/// What [`TokenOptimizer::optimize_in_place`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InPlaceReport {
    /// Types visited without a fault
    pub types_processed: usize,
    /// Documentation strings that changed
    pub docs_rewritten: usize,
    /// Documentation strings cut down to the length cap
    pub docs_truncated: usize,
    /// Types whose processing faulted and were left as they were
    pub faults: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenOptimizer;

impl TokenOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the identifier-keyed form of `codebase`
    ///
    /// The interner is reset first, so ids always start at 1 and the exported
    /// table covers exactly this codebase. Strings are interned in document
    /// order, which keeps the output stable for the same input.
    pub fn optimize(
        &self,
        codebase: &Codebase,
        interner: &mut StringInterner,
    ) -> Result<IndexedCodebase> {
        codebase.validate()?;
        interner.reset();

        let root = interner.intern_or_lookup(&codebase.root.to_string_lossy().replace('\\', "/"));
        let namespaces = codebase
            .namespaces
            .iter()
            .map(|ns| interner.intern_or_lookup(ns))
            .collect();

        let files: Vec<IndexedFile> = codebase
            .files
            .iter()
            .map(|file| index_file(file, interner))
            .collect();

        debug!(
            "Optimized {} files into {} distinct strings",
            files.len(),
            interner.len()
        );

        Ok(IndexedCodebase {
            optimization_level: OPTIMIZATION_LEVEL.to_string(),
            root,
            created_at: codebase.created_at,
            file_count: files.len(),
            namespaces,
            files,
            string_table: interner.export_table(),
        })
    }

    /// Normalize every documentation string on the live graph
    ///
    /// Validation runs over the whole graph before anything is touched. A fault
    /// while processing one type is recorded in the report and the remaining
    /// types are still processed.
    pub fn optimize_in_place(&self, codebase: &mut Codebase) -> Result<InPlaceReport> {
        codebase.validate()?;

        let mut report = InPlaceReport::default();
        for file in &mut codebase.files {
            let path = file.display_path();
            for ty in &mut file.types {
                let mut counts = DocCounts::default();
                let outcome = catch_unwind(AssertUnwindSafe(|| normalize_type_docs(ty, &mut counts)));
                match outcome {
                    Ok(()) => {
                        report.types_processed += 1;
                        report.docs_rewritten += counts.rewritten;
                        report.docs_truncated += counts.truncated;
                    }
                    Err(_) => {
                        warn!("Failed to optimize {} in {}", ty.name, path);
                        report.faults.push(format!("{}::{}", path, ty.fully_qualified_name()));
                    }
                }
            }
        }

        debug!(
            "In-place optimization: {} types, {} docs rewritten, {} truncated",
            report.types_processed, report.docs_rewritten, report.docs_truncated
        );
        Ok(report)
    }
}

#[derive(Default)]
struct DocCounts {
    rewritten: usize,
    truncated: usize,
}

fn normalize_in_place(doc: &mut String, counts: &mut DocCounts) {
    if doc.is_empty() {
        return;
    }
    let normalized = normalize_documentation(doc);
    if normalized != *doc {
        if docs::exceeds_cap(&docs::collapse_whitespace(doc)) {
            counts.truncated += 1;
        }
        counts.rewritten += 1;
        *doc = normalized;
    }
}

fn normalize_type_docs(ty: &mut TypeEntity, counts: &mut DocCounts) {
    trace!("Normalizing docs for {}", ty.name);
    normalize_in_place(&mut ty.documentation, counts);
    for method in &mut ty.methods {
        normalize_in_place(&mut method.documentation, counts);
    }
    for property in &mut ty.properties {
        normalize_in_place(&mut property.documentation, counts);
    }
}

/// Intern normalized documentation; empty text becomes the absent id
fn intern_docs(doc: &str, interner: &mut StringInterner) -> u32 {
    interner.intern_or_lookup(&normalize_documentation(doc))
}

fn index_file(file: &SourceFile, interner: &mut StringInterner) -> IndexedFile {
    IndexedFile {
        path: interner.intern_or_lookup(&file.display_path()),
        lang: interner.intern_or_lookup(&file.language),
        size: file.size,
        modified: file.last_modified,
        ns: file.namespaces.iter().map(|ns| interner.intern_or_lookup(ns)).collect(),
        imports: file.imports.iter().map(|i| interner.intern_or_lookup(i)).collect(),
        types: file.types.iter().map(|ty| index_type(ty, interner)).collect(),
    }
}

fn index_type(ty: &TypeEntity, interner: &mut StringInterner) -> IndexedType {
    IndexedType {
        name: interner.intern_or_lookup(&ty.name),
        fqn: interner.intern_or_lookup(&ty.fully_qualified_name()),
        ns: interner.intern_or_lookup(&ty.namespace),
        kind: interner.intern_or_lookup(ty.kind.as_str()),
        access: interner.intern_or_lookup(ty.access.as_str()),
        is_static: ty.is_static,
        is_abstract: ty.is_abstract,
        is_sealed: ty.is_sealed,
        is_partial: ty.is_partial,
        is_nested: ty.is_nested(),
        parent: interner.intern_optional(ty.parent_type.as_deref()),
        docs: intern_docs(&ty.documentation, interner),
        members: ty
            .enum_members
            .iter()
            .map(|m| interner.intern_or_lookup(m))
            .collect(),
        methods: ty.methods.iter().map(|m| index_method(m, interner)).collect(),
        props: ty
            .properties
            .iter()
            .map(|p| index_property(p, interner))
            .collect(),
        rels: ty
            .relationships
            .iter()
            .map(|r| IndexedRelationship {
                kind: interner.intern_or_lookup(r.kind.as_str()),
                target: interner.intern_or_lookup(&r.target),
                desc: interner.intern_optional(r.description.as_deref()),
            })
            .collect(),
    }
}

fn index_method(method: &Method, interner: &mut StringInterner) -> IndexedMethod {
    IndexedMethod {
        name: interner.intern_or_lookup(&method.name),
        ret: interner.intern_or_lookup(&method.return_type),
        access: interner.intern_or_lookup(method.access.as_str()),
        is_static: method.is_static,
        is_virtual: method.is_virtual,
        is_override: method.is_override,
        is_abstract: method.is_abstract,
        is_async: method.is_async,
        sig: interner.intern_or_lookup(&compact_signature(method)),
        docs: intern_docs(&method.documentation, interner),
        params: method
            .parameters
            .iter()
            .map(|p| index_parameter(p, interner))
            .collect(),
        start: method.start_line,
        end: method.end_line,
    }
}

fn index_parameter(param: &Parameter, interner: &mut StringInterner) -> IndexedParameter {
    IndexedParameter {
        name: interner.intern_or_lookup(&param.name),
        type_id: interner.intern_or_lookup(&param.type_name),
        default: interner.intern_optional(param.default_value.as_deref()),
        is_opt: param.is_optional,
        is_by_ref: param.is_by_ref,
        is_out: param.is_out,
        is_params: param.is_params,
    }
}

fn index_property(property: &Property, interner: &mut StringInterner) -> IndexedProperty {
    IndexedProperty {
        name: interner.intern_or_lookup(&property.name),
        type_id: interner.intern_or_lookup(&property.type_name),
        access: interner.intern_or_lookup(property.access.as_str()),
        is_static: property.is_static,
        is_virtual: property.is_virtual,
        is_override: property.is_override,
        is_abstract: property.is_abstract,
        has_getter: property.has_getter,
        has_setter: property.has_setter,
        has_private_setter: property.has_private_setter,
        is_auto: property.is_auto_implemented,
        docs: intern_docs(&property.documentation, interner),
        start: property.start_line,
        end: property.end_line,
    }
}
