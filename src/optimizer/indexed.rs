//! Identifier-keyed form of a codebase
//!
//! Every string is replaced by its id in [`IndexedCodebase::string_table`];
//! id 0 means "absent". Field names are deliberately short because this form
//! exists to be fed to token-limited consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interner::ABSENT;
use crate::model::is_false;

fn is_absent(id: &u32) -> bool {
    *id == ABSENT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedCodebase {
    /// Marks the form so consumers can tell it apart from a raw codebase
    pub optimization_level: String,
    pub root: u32,
    pub created_at: DateTime<Utc>,
    pub file_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<IndexedFile>,
    pub string_table: Vec<String>,
}

impl IndexedCodebase {
    /// Look up the text behind an id; `None` for [`ABSENT`] and unknown ids
    pub fn resolve(&self, id: u32) -> Option<&str> {
        if id == ABSENT {
            return None;
        }
        self.string_table.get(id as usize - 1).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedFile {
    pub path: u32,
    pub lang: u32,
    pub size: u64,
    pub modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ns: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<IndexedType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedType {
    pub name: u32,
    pub fqn: u32,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub ns: u32,
    pub kind: u32,
    pub access: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sealed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_partial: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_nested: bool,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub parent: u32,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub docs: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<IndexedMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<IndexedProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rels: Vec<IndexedRelationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedMethod {
    pub name: u32,
    pub ret: u32,
    pub access: u32,
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
    /// Compact signature, see [`super::signature::compact_signature`]
    pub sig: u32,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub docs: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<IndexedParameter>,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedParameter {
    pub name: u32,
    #[serde(rename = "type")]
    pub type_id: u32,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub default: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_opt: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_by_ref: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_out: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_params: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedProperty {
    pub name: u32,
    #[serde(rename = "type")]
    pub type_id: u32,
    pub access: u32,
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
    pub is_auto: bool,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub docs: u32,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRelationship {
    pub kind: u32,
    pub target: u32,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub desc: u32,
}
