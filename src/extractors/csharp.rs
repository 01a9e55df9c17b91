// C# parser
//
// Builds the entity model for one .cs file from a tree-sitter-c-sharp syntax
// tree. Handles:
// - Block and file-scoped namespaces, nested namespaces joined with '.'
// - using directives (plain, static, global, alias)
// - Classes, records, interfaces, structs, record structs and enums
// - Methods, constructors and properties with their modifiers
// - Positional record parameters as properties
// - Base lists as inheritance/implementation relationships
// - /// documentation with XML tags removed

use std::path::Path;

use tracing::{debug, trace};
use tree_sitter::{Node, Parser, Tree};

use super::base::{BaseExtractor, TYPE_NODE_KINDS};
use super::{LanguageParser, ParseError};
use crate::model::{
    AccessLevel, Method, Parameter, Property, Relationship, RelationshipKind, SourceFile,
    TypeEntity, TypeKind,
};

const LANGUAGE: &str = "csharp";

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "struct_declaration",
    "enum_declaration",
    "record_declaration",
    "record_struct_declaration",
];

/// Which member access levels survive extraction
///
/// Public and `private protected` members are always kept. A
/// `protected internal` member is kept when either of its two halves is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFilter {
    pub private: bool,
    pub protected: bool,
    pub internal: bool,
}

impl Default for MemberFilter {
    fn default() -> Self {
        Self {
            private: true,
            protected: true,
            internal: true,
        }
    }
}

impl MemberFilter {
    pub fn keeps(&self, access: AccessLevel) -> bool {
        match access {
            AccessLevel::Public | AccessLevel::PrivateProtected => true,
            AccessLevel::Private => self.private,
            AccessLevel::Protected => self.protected,
            AccessLevel::Internal => self.internal,
            AccessLevel::ProtectedInternal => self.protected || self.internal,
        }
    }
}

/// tree-sitter backed [`LanguageParser`] for C#
#[derive(Debug, Clone, Default)]
pub struct CSharpParser {
    members: MemberFilter,
}

impl CSharpParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop methods and properties whose access level `members` rejects
    pub fn with_member_filter(members: MemberFilter) -> Self {
        Self { members }
    }

    fn parse_tree(&self, path: &Path, source: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| ParseError::Grammar {
                language: LANGUAGE,
                reason: e.to_string(),
            })?;

        parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            path: path.to_path_buf(),
        })
    }
}

impl LanguageParser for CSharpParser {
    fn language(&self) -> &'static str {
        LANGUAGE
    }

    fn can_parse_extension(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case("cs")
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError> {
        let tree = self.parse_tree(path, source)?;
        let root = tree.root_node();

        let extractor = CSharpExtractor::new(source, self.members);
        let mut file = SourceFile::new(path, LANGUAGE);
        extractor.walk_scope(root, "", &mut file);

        if root.has_error() {
            let recovered =
                !file.types.is_empty() || !file.namespaces.is_empty() || !file.imports.is_empty();
            if !recovered && !source.trim().is_empty() {
                let line = first_error_line(root).unwrap_or(1);
                return Err(ParseError::Syntax {
                    path: path.to_path_buf(),
                    reason: format!("no declarations recovered, first error on line {}", line),
                });
            }
            debug!(
                "Syntax errors in {}, kept {} recovered types",
                path.display(),
                file.types.len()
            );
        }

        Ok(file)
    }
}

fn first_error_line(node: Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row as u32 + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

struct CSharpExtractor<'s> {
    base: BaseExtractor<'s>,
    members: MemberFilter,
}

impl<'s> CSharpExtractor<'s> {
    fn new(content: &'s str, members: MemberFilter) -> Self {
        Self {
            base: BaseExtractor::new(LANGUAGE, content),
            members,
        }
    }

    /// Walk the declarations of a compilation unit or namespace body
    fn walk_scope(&self, node: Node, namespace: &str, file: &mut SourceFile) {
        // A file-scoped namespace applies to every declaration after it, whether
        // the grammar nests them under the namespace node or not
        let mut current_namespace = namespace.to_string();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "using_directive" => {
                    if let Some(import) = self.extract_using(&child) {
                        file.imports.push(import);
                    }
                }
                "namespace_declaration" => {
                    let Some(full) = self.namespace_name(&child, namespace) else {
                        continue;
                    };
                    push_unique(&mut file.namespaces, &full);
                    let body = child
                        .child_by_field_name("body")
                        .or_else(|| self.base.find_child_by_type(&child, "declaration_list"));
                    if let Some(body) = body {
                        self.walk_scope(body, &full, file);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let Some(full) = self.namespace_name(&child, namespace) else {
                        continue;
                    };
                    push_unique(&mut file.namespaces, &full);
                    self.walk_scope(child, &full, file);
                    current_namespace = full;
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => {
                    self.extract_type(child, &current_namespace, None, file);
                }
                _ => {}
            }
        }
    }

    fn namespace_name(&self, node: &Node, outer: &str) -> Option<String> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| self.base.find_child_by_types(node, &["qualified_name", "identifier"]))?;
        let name = self.base.get_node_text(&name_node);
        if outer.is_empty() {
            Some(name)
        } else {
            Some(format!("{}.{}", outer, name))
        }
    }

    /// Text of a using directive after the `using`/`using static` keywords
    fn extract_using(&self, node: &Node) -> Option<String> {
        let text = self.base.get_node_text(node);
        let mut rest = text.trim();
        rest = rest.strip_prefix("global").map(str::trim_start).unwrap_or(rest);
        rest = rest.strip_prefix("using")?.trim_start();
        rest = rest.strip_prefix("static ").map(str::trim_start).unwrap_or(rest);
        let rest = rest.trim_end_matches(';').trim();

        let import = rest.split_whitespace().collect::<Vec<_>>().join(" ");
        if import.is_empty() { None } else { Some(import) }
    }

    fn extract_type(&self, node: Node, namespace: &str, parent: Option<&str>, file: &mut SourceFile) {
        let Some(name_node) = node
            .child_by_field_name("name")
            .or_else(|| self.base.find_child_by_type(&node, "identifier"))
        else {
            return;
        };
        let name = self.base.get_node_text(&name_node);
        let modifiers = self.extract_modifiers(&node);

        let kind = match node.kind() {
            "interface_declaration" => TypeKind::Interface,
            "struct_declaration" | "record_struct_declaration" => TypeKind::Struct,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" if self.is_record_struct(&node, &modifiers) => TypeKind::Struct,
            _ => TypeKind::Class,
        };
        trace!("Extracting {} {}", kind.as_str(), name);

        let default_access = if parent.is_some() {
            AccessLevel::Private
        } else {
            AccessLevel::Internal
        };

        let mut entity = TypeEntity::new(name.clone(), namespace, kind);
        entity.access = AccessLevel::from_modifiers(&modifiers).unwrap_or(default_access);
        entity.is_static = has_modifier(&modifiers, "static");
        entity.is_abstract = has_modifier(&modifiers, "abstract");
        entity.is_sealed = has_modifier(&modifiers, "sealed");
        entity.is_partial = has_modifier(&modifiers, "partial");
        entity.parent_type = parent.map(str::to_string);
        entity.documentation = self.base.find_doc_comment(&node).unwrap_or_default();
        entity.relationships = self.extract_relationships(&node, kind);

        if node.kind().starts_with("record") {
            if let Some(params) = self.base.find_child_by_type(&node, "parameter_list") {
                entity.properties.extend(self.record_properties(&params));
            }
        }

        let mut nested = Vec::new();
        let body = node.child_by_field_name("body").or_else(|| {
            self.base
                .find_child_by_types(&node, &["declaration_list", "enum_member_declaration_list"])
        });

        if let Some(body) = body {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                match member.kind() {
                    "method_declaration" => {
                        if let Some(method) = self.extract_method(&member, kind) {
                            self.push_method(&mut entity, method);
                        }
                    }
                    "constructor_declaration" => {
                        if let Some(ctor) = self.extract_constructor(&member, kind) {
                            self.push_method(&mut entity, ctor);
                        }
                    }
                    "property_declaration" => {
                        if let Some(property) = self.extract_property(&member, kind) {
                            if self.keep_member(property.access) {
                                entity.properties.push(property);
                            }
                        }
                    }
                    "enum_member_declaration" => {
                        if let Some(member_name) = member
                            .child_by_field_name("name")
                            .or_else(|| self.base.find_child_by_type(&member, "identifier"))
                        {
                            entity.enum_members.push(self.base.get_node_text(&member_name));
                        }
                    }
                    kind if TYPE_DECLARATIONS.contains(&kind) => nested.push(member),
                    _ => {}
                }
            }
        }

        file.types.push(entity);
        for child in nested {
            self.extract_type(child, namespace, Some(&name), file);
        }
    }

    fn is_record_struct(&self, node: &Node, modifiers: &[String]) -> bool {
        let mut cursor = node.walk();
        has_modifier(modifiers, "struct") || node.children(&mut cursor).any(|c| c.kind() == "struct")
    }

    fn keep_member(&self, access: AccessLevel) -> bool {
        self.members.keeps(access)
    }

    fn push_method(&self, entity: &mut TypeEntity, method: Method) {
        if self.keep_member(method.access) {
            entity.methods.push(method);
        }
    }

    fn extract_modifiers(&self, node: &Node) -> Vec<String> {
        self.base
            .find_children_by_type(node, "modifier")
            .iter()
            .map(|m| self.base.get_node_text(m).trim().to_string())
            .collect()
    }

    fn member_access(&self, modifiers: &[String], owner: TypeKind) -> AccessLevel {
        AccessLevel::from_modifiers(modifiers).unwrap_or(match owner {
            TypeKind::Interface => AccessLevel::Public,
            _ => AccessLevel::Private,
        })
    }

    fn base_types(&self, node: &Node) -> Vec<String> {
        let Some(base_list) = self.base.find_child_by_type(node, "base_list") else {
            return Vec::new();
        };
        let mut cursor = base_list.walk();
        base_list
            .children(&mut cursor)
            .filter(|c| c.kind() != ":" && c.kind() != ",")
            .map(|c| {
                let text = self.base.get_node_text(&c);
                // `Base(args)` in a primary constructor base clause
                match text.find('(') {
                    Some(idx) => text[..idx].trim().to_string(),
                    None => text.trim().to_string(),
                }
            })
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn extract_relationships(&self, node: &Node, kind: TypeKind) -> Vec<Relationship> {
        let bases = self.base_types(node);
        match kind {
            // Enum base is the underlying integral type
            TypeKind::Enum => Vec::new(),
            TypeKind::Interface => bases
                .into_iter()
                .map(|b| Relationship::new(RelationshipKind::Inheritance, b))
                .collect(),
            TypeKind::Struct => bases
                .into_iter()
                .map(|b| Relationship::new(RelationshipKind::Implementation, b))
                .collect(),
            TypeKind::Class => bases
                .into_iter()
                .enumerate()
                .map(|(i, b)| {
                    let relationship = if i == 0 && !looks_like_interface(&b) {
                        RelationshipKind::Inheritance
                    } else {
                        RelationshipKind::Implementation
                    };
                    Relationship::new(relationship, b)
                })
                .collect(),
        }
    }

    fn extract_method(&self, node: &Node, owner: TypeKind) -> Option<Method> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let param_index = children.iter().position(|c| c.kind() == "parameter_list")?;

        // Name is the last identifier before the parameter list (type parameters may sit between)
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| children[..param_index].iter().rev().find(|c| c.kind() == "identifier").copied())?;
        let name_index = children.iter().position(|c| c.id() == name_node.id())?;

        let return_type = node
            .child_by_field_name("returns")
            .or_else(|| {
                children[..name_index]
                    .iter()
                    .find(|c| TYPE_NODE_KINDS.contains(&c.kind()))
                    .copied()
            })
            .map(|n| self.base.get_node_text(&n))
            .unwrap_or_else(|| "void".to_string());

        let modifiers = self.extract_modifiers(node);
        let mut method = Method::new(
            self.base.get_node_text(&name_node),
            return_type,
            self.member_access(&modifiers, owner),
        );
        method.is_static = has_modifier(&modifiers, "static");
        method.is_virtual = has_modifier(&modifiers, "virtual");
        method.is_override = has_modifier(&modifiers, "override");
        method.is_abstract = has_modifier(&modifiers, "abstract");
        method.is_async = has_modifier(&modifiers, "async");
        (method.start_line, method.end_line) = self.base.line_span(node);
        method.documentation = self.base.find_doc_comment(node).unwrap_or_default();
        method.parameters = self.extract_parameters(&children[param_index]);

        Some(method)
    }

    /// Constructors are methods whose return type is the declaring type
    fn extract_constructor(&self, node: &Node, owner: TypeKind) -> Option<Method> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| self.base.find_child_by_type(node, "identifier"))?;
        let name = self.base.get_node_text(&name_node);
        let modifiers = self.extract_modifiers(node);

        let mut ctor = Method::new(name.clone(), name, self.member_access(&modifiers, owner));
        ctor.is_static = has_modifier(&modifiers, "static");
        (ctor.start_line, ctor.end_line) = self.base.line_span(node);
        ctor.documentation = self.base.find_doc_comment(node).unwrap_or_default();
        if let Some(params) = self.base.find_child_by_type(node, "parameter_list") {
            ctor.parameters = self.extract_parameters(&params);
        }

        Some(ctor)
    }

    fn extract_parameters(&self, list: &Node) -> Vec<Parameter> {
        let mut cursor = list.walk();
        let children: Vec<Node> = list.children(&mut cursor).collect();
        let mut params = Vec::new();
        let mut i = 0;
        while i < children.len() {
            let child = children[i];
            match child.kind() {
                "parameter" | "parameter_array" => {
                    params.extend(self.extract_parameter(&child));
                }
                // Grammars that inline the params array: `params` TYPE NAME
                "params" => {
                    let rest = &children[i + 1..];
                    let end = rest
                        .iter()
                        .position(|c| matches!(c.kind(), "," | ")"))
                        .unwrap_or(rest.len());
                    let parts = &rest[..end];
                    let name = parts.iter().rev().find(|c| c.kind() == "identifier");
                    let type_node = parts
                        .iter()
                        .find(|c| Some(c.id()) != name.map(|n| n.id()) && TYPE_NODE_KINDS.contains(&c.kind()));
                    if let Some(name) = name {
                        let type_name = type_node
                            .map(|t| self.base.get_node_text(t))
                            .unwrap_or_else(|| "object[]".to_string());
                        let mut param = Parameter::new(self.base.get_node_text(name), type_name);
                        param.is_params = true;
                        params.push(param);
                    }
                    i += end;
                }
                _ => {}
            }
            i += 1;
        }
        params
    }

    fn extract_parameter(&self, node: &Node) -> Option<Parameter> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let default_index = children
            .iter()
            .position(|c| matches!(c.kind(), "=" | "equals_value_clause"));
        let head = &children[..default_index.unwrap_or(children.len())];

        let name_node = node
            .child_by_field_name("name")
            .or_else(|| head.iter().rev().find(|c| c.kind() == "identifier").copied())?;
        let type_node = node.child_by_field_name("type").or_else(|| {
            head.iter()
                .find(|c| c.id() != name_node.id() && TYPE_NODE_KINDS.contains(&c.kind()))
                .copied()
        });

        let mut type_name = type_node
            .map(|t| self.base.get_node_text(&t))
            .unwrap_or_else(|| "var".to_string());

        let keywords: Vec<String> = head
            .iter()
            .filter(|c| c.id() != name_node.id() && Some(c.id()) != type_node.map(|t| t.id()))
            .map(|c| self.base.get_node_text(c).trim().to_string())
            .collect();
        let has = |kw: &str| keywords.iter().any(|k| k == kw);

        let mut param = Parameter::new(self.base.get_node_text(&name_node), String::new());
        param.is_out = has("out");
        param.is_by_ref = has("ref");
        param.is_params = has("params") || node.kind() == "parameter_array";

        // Some grammar versions fold `ref` into the type node
        if let Some(rest) = type_name.strip_prefix("ref ") {
            param.is_by_ref = true;
            type_name = rest.trim().to_string();
        }
        param.type_name = type_name;

        if let Some(index) = default_index {
            let literal = if children[index].kind() == "equals_value_clause" {
                self.base
                    .get_node_text(&children[index])
                    .trim()
                    .trim_start_matches('=')
                    .trim()
                    .to_string()
            } else {
                children[index + 1..]
                    .iter()
                    .map(|c| self.base.get_node_text(c))
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            };
            if literal.is_empty() {
                param.is_optional = true;
            } else {
                param = param.with_default(literal);
            }
        }

        Some(param)
    }

    fn extract_property(&self, node: &Node, owner: TypeKind) -> Option<Property> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let body_index = children
            .iter()
            .position(|c| matches!(c.kind(), "accessor_list" | "arrow_expression_clause"))
            .unwrap_or(children.len());

        let name_node = node.child_by_field_name("name").or_else(|| {
            children[..body_index]
                .iter()
                .rev()
                .find(|c| c.kind() == "identifier")
                .copied()
        })?;
        let name_index = children.iter().position(|c| c.id() == name_node.id())?;

        let type_name = node
            .child_by_field_name("type")
            .or_else(|| {
                children[..name_index]
                    .iter()
                    .find(|c| TYPE_NODE_KINDS.contains(&c.kind()))
                    .copied()
            })
            .map(|t| self.base.get_node_text(&t))
            .unwrap_or_else(|| "var".to_string());

        let modifiers = self.extract_modifiers(node);
        let mut property = Property::new(
            self.base.get_node_text(&name_node),
            type_name,
            self.member_access(&modifiers, owner),
        );
        property.is_static = has_modifier(&modifiers, "static");
        property.is_virtual = has_modifier(&modifiers, "virtual");
        property.is_override = has_modifier(&modifiers, "override");
        property.is_abstract = has_modifier(&modifiers, "abstract");
        (property.start_line, property.end_line) = self.base.line_span(node);
        property.documentation = self.base.find_doc_comment(node).unwrap_or_default();

        match children.get(body_index) {
            Some(list) if list.kind() == "accessor_list" => {
                let accessors = self.base.find_children_by_type(list, "accessor_declaration");
                let mut all_bodyless = !accessors.is_empty();
                for accessor in &accessors {
                    let accessor_modifiers = self.extract_modifiers(accessor);
                    match self.accessor_keyword(accessor).as_deref() {
                        Some("get") => property.has_getter = true,
                        Some("set") | Some("init") => {
                            property.has_setter = true;
                            if has_modifier(&accessor_modifiers, "private") {
                                property.has_private_setter = true;
                            }
                        }
                        _ => {}
                    }
                    let has_body = self
                        .base
                        .find_child_by_types(accessor, &["block", "arrow_expression_clause"])
                        .is_some();
                    all_bodyless &= !has_body;
                }
                property.is_auto_implemented =
                    all_bodyless && owner != TypeKind::Interface && !property.is_abstract;
            }
            // Expression-bodied property: getter only
            Some(_) => property.has_getter = true,
            None => {}
        }

        Some(property)
    }

    /// `get`, `set`, `init`, `add` or `remove`
    fn accessor_keyword(&self, accessor: &Node) -> Option<String> {
        let mut cursor = accessor.walk();
        accessor
            .children(&mut cursor)
            .find(|c| !matches!(c.kind(), "attribute_list" | "modifier"))
            .map(|c| self.base.get_node_text(&c).trim().to_string())
    }

    /// Positional record parameters become public get-only auto properties
    fn record_properties(&self, list: &Node) -> Vec<Property> {
        self.base
            .find_children_by_type(list, "parameter")
            .iter()
            .filter_map(|node| {
                let param = self.extract_parameter(node)?;
                let mut property = Property::new(param.name, param.type_name, AccessLevel::Public);
                property.has_getter = true;
                property.is_auto_implemented = true;
                (property.start_line, property.end_line) = self.base.line_span(node);
                Some(property)
            })
            .collect()
    }
}

fn has_modifier(modifiers: &[String], keyword: &str) -> bool {
    modifiers.iter().any(|m| m == keyword)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// `I` followed by an uppercase letter, ignoring namespace and type arguments
fn looks_like_interface(type_name: &str) -> bool {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let simple = without_generics.rsplit('.').next().unwrap_or(without_generics).trim();
    let mut chars = simple.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('I'), Some(second)) if second.is_uppercase()
    )
}
