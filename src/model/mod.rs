//! Entity model for an indexed source tree
//!
//! Plain data describing what a parser found: types, their members and how they
//! relate to each other. The [`Codebase`] aggregate owns every file and type
//! beneath it. Nested types point at their enclosing type by name only.
//!
//! Every `bool` flag, empty list and empty documentation string is skipped when
//! serialized and restored through `#[serde(default)]`, so the text form stays
//! small without losing anything on the way back.

mod codebase;

pub use codebase::{Codebase, CodebaseSummary, InvalidEntity};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Kind of a declared type - one tagged entity instead of a type hierarchy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "struct" => Some(TypeKind::Struct),
            "enum" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

/// Declared accessibility of a type or member
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "protected")]
    Protected,
    #[default]
    #[serde(rename = "internal")]
    Internal,
    #[serde(rename = "protected internal")]
    ProtectedInternal,
    /// C# 7.2 `private protected`; has no short token and is emitted as written
    #[serde(rename = "private protected")]
    PrivateProtected,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Private => "private",
            AccessLevel::Protected => "protected",
            AccessLevel::Internal => "internal",
            AccessLevel::ProtectedInternal => "protected internal",
            AccessLevel::PrivateProtected => "private protected",
        }
    }

    /// Resolve a modifier list to an access level. Order of the modifiers does
    /// not matter (`internal protected` is the same as `protected internal`).
    pub fn from_modifiers<S: AsRef<str>>(modifiers: &[S]) -> Option<Self> {
        let has = |m: &str| modifiers.iter().any(|x| x.as_ref() == m);
        match (has("public"), has("private"), has("protected"), has("internal")) {
            (true, _, _, _) => Some(AccessLevel::Public),
            (_, true, true, _) => Some(AccessLevel::PrivateProtected),
            (_, _, true, true) => Some(AccessLevel::ProtectedInternal),
            (_, true, _, _) => Some(AccessLevel::Private),
            (_, _, true, _) => Some(AccessLevel::Protected),
            (_, _, _, true) => Some(AccessLevel::Internal),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one type relates to another
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Derived from a base class (or an interface extending another)
    Inheritance,
    Implementation,
    /// Has a member of the target type
    Composition,
    /// Holds a collection of the target type
    Aggregation,
    /// Uses the target as a parameter or local
    Dependency,
    Association,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Inheritance => "inheritance",
            RelationshipKind::Implementation => "implementation",
            RelationshipKind::Composition => "composition",
            RelationshipKind::Aggregation => "aggregation",
            RelationshipKind::Dependency => "dependency",
            RelationshipKind::Association => "association",
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge from the owning type to another type, by target name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Default value literal exactly as written in source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_by_ref: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_out: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_params: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Mark the parameter optional with the given default literal
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.is_optional = true;
        self.default_value = Some(literal.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub access: AccessLevel,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_override: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_async: bool,
    /// 1-based
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>, access: AccessLevel) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            access,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub access: AccessLevel,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_override: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_getter: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_setter: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_private_setter: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_auto_implemented: bool,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, access: AccessLevel) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            access,
            ..Default::default()
        }
    }
}

/// A class, interface, struct or enum
///
/// The fully qualified name is never stored; it is always derived from
/// `namespace` and `name` so the two cannot drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeEntity {
    pub name: String,
    /// Empty for types in the global namespace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub kind: TypeKind,
    pub access: AccessLevel,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sealed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_partial: bool,
    /// Name of the enclosing type; `Some` exactly when the type is nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    /// Member names, only populated for [`TypeKind::Enum`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl TypeEntity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn nested_in(mut self, parent: impl Into<String>) -> Self {
        self.parent_type = Some(parent.into());
        self
    }

    pub fn fully_qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_nested(&self) -> bool {
        self.parent_type.is_some()
    }
}

/// One parsed source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub absolute_path: PathBuf,
    /// Unix-style path relative to the codebase root
    pub relative_path: String,
    pub language: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeEntity>,
}

impl SourceFile {
    pub fn new(absolute_path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            relative_path: String::new(),
            language: language.into(),
            size: 0,
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            namespaces: Vec::new(),
            imports: Vec::new(),
            types: Vec::new(),
        }
    }

    /// The path consumers should display: relative when known, absolute otherwise
    pub fn display_path(&self) -> String {
        if self.relative_path.is_empty() {
            self.absolute_path.to_string_lossy().replace('\\', "/")
        } else {
            self.relative_path.clone()
        }
    }
}
