// Shared tree-sitter helpers for the bundled extractors

use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

static XML_TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

/// Node kinds that can appear where a C#-like grammar expects a type
pub const TYPE_NODE_KINDS: &[&str] = &[
    "predefined_type",
    "identifier",
    "qualified_name",
    "generic_name",
    "array_type",
    "nullable_type",
    "tuple_type",
    "pointer_type",
    "ref_type",
];

/// Source text plus helpers to read nodes out of it
pub struct BaseExtractor<'s> {
    pub language: &'static str,
    pub content: &'s str,
}

impl<'s> BaseExtractor<'s> {
    pub fn new(language: &'static str, content: &'s str) -> Self {
        Self { language, content }
    }

    /// Text covered by `node`; empty when the node lies outside the content
    pub fn get_node_text(&self, node: &Node) -> String {
        let bytes = self.content.as_bytes();
        let (start, end) = (node.start_byte(), node.end_byte());
        if start <= end && end <= bytes.len() {
            String::from_utf8_lossy(&bytes[start..end]).to_string()
        } else {
            String::new()
        }
    }

    pub fn find_child_by_type<'a>(&self, node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).find(|c| c.kind() == kind)
    }

    pub fn find_children_by_type<'a>(&self, node: &Node<'a>, kind: &str) -> Vec<Node<'a>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).filter(|c| c.kind() == kind).collect()
    }

    pub fn find_child_by_types<'a>(&self, node: &Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).find(|c| kinds.contains(&c.kind()))
    }

    /// 1-based line span of a node
    pub fn line_span(&self, node: &Node) -> (u32, u32) {
        (
            node.start_position().row as u32 + 1,
            node.end_position().row as u32 + 1,
        )
    }

    /// `///` documentation block directly above `node`, markup removed
    ///
    /// Only comment siblings on consecutive lines ending right above the node
    /// count; a blank line or any other node breaks the block.
    pub fn find_doc_comment(&self, node: &Node) -> Option<String> {
        let mut lines = Vec::new();
        let mut expected_row = node.start_position().row;
        let mut current = node.prev_sibling();

        while let Some(sibling) = current {
            if sibling.kind() != "comment" || sibling.end_position().row + 1 < expected_row {
                break;
            }
            let text = self.get_node_text(&sibling);
            let Some(body) = text.trim_start().strip_prefix("///") else {
                break;
            };
            lines.push(body.trim().to_string());
            expected_row = sibling.start_position().row;
            current = sibling.prev_sibling();
        }

        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        let doc = strip_doc_markup(&lines.join("\n"));
        if doc.trim().is_empty() { None } else { Some(doc) }
    }
}

/// Remove XML documentation tags, keeping their inner text
pub fn strip_doc_markup(raw: &str) -> String {
    let stripped = match XML_TAG_RE.as_ref() {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    };
    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
