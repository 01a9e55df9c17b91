// C# parser tests
//
// Each test parses a small snippet with the real tree-sitter grammar and checks
// the entity model that comes out.

use std::path::Path;

use crate::extractors::{CSharpParser, LanguageParser, MemberFilter, ParseError};
use crate::model::{AccessLevel, RelationshipKind, SourceFile, TypeEntity, TypeKind};
use crate::optimizer::compact_signature;

fn parse(code: &str) -> SourceFile {
    CSharpParser::new()
        .parse(Path::new("Test.cs"), code)
        .expect("snippet should parse")
}

fn find_type<'a>(file: &'a SourceFile, name: &str) -> &'a TypeEntity {
    file.types
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("type {} not extracted", name))
}

#[test]
fn test_parser_identity() {
    let parser = CSharpParser::new();
    assert_eq!(parser.language(), "csharp");
    assert!(parser.can_parse_extension("cs"));
    assert!(parser.can_parse_extension("CS"));
    assert!(!parser.can_parse_extension("ts"));
}

#[test]
fn test_usings_and_block_namespace() {
    let code = r#"
using System;
using System.Collections.Generic;
using static System.Math;
global using System.Linq;
using Json = System.Text.Json;

namespace MyCompany.MyProject
{
    public class Widget { }
}
"#;
    let file = parse(code);

    assert_eq!(
        file.imports,
        vec![
            "System",
            "System.Collections.Generic",
            "System.Math",
            "System.Linq",
            "Json = System.Text.Json",
        ]
    );
    assert_eq!(file.namespaces, vec!["MyCompany.MyProject"]);
    assert_eq!(file.language, "csharp");

    let widget = find_type(&file, "Widget");
    assert_eq!(widget.namespace, "MyCompany.MyProject");
    assert_eq!(widget.fully_qualified_name(), "MyCompany.MyProject.Widget");
}

#[test]
fn test_nested_block_namespaces_are_joined() {
    let code = r#"
namespace Outer
{
    namespace Inner
    {
        class Deep { }
    }

    class Shallow { }
}
"#;
    let file = parse(code);

    assert_eq!(file.namespaces, vec!["Outer", "Outer.Inner"]);
    assert_eq!(find_type(&file, "Deep").namespace, "Outer.Inner");
    assert_eq!(find_type(&file, "Shallow").namespace, "Outer");
}

#[test]
fn test_file_scoped_namespace() {
    let code = r#"
using System;

namespace Shop.Orders;

public class Order { }

public interface IOrderSource { }
"#;
    let file = parse(code);

    assert_eq!(file.namespaces, vec!["Shop.Orders"]);
    assert_eq!(find_type(&file, "Order").namespace, "Shop.Orders");
    assert_eq!(find_type(&file, "IOrderSource").namespace, "Shop.Orders");
}

#[test]
fn test_global_namespace_type() {
    let file = parse("class Program { static void Main() { } }");

    let program = find_type(&file, "Program");
    assert_eq!(program.namespace, "");
    assert_eq!(program.fully_qualified_name(), "Program");
    assert!(file.namespaces.is_empty());
}

#[test]
fn test_type_kinds_and_modifiers() {
    let code = r#"
namespace Kinds
{
    public abstract class Shape { }
    public sealed partial class Circle : Shape { }
    internal static class Helpers { }
    public interface IDrawable { }
    public struct Point { }
    public enum Color { Red, Green = 2, Blue }
    class Hidden { }
}
"#;
    let file = parse(code);

    let shape = find_type(&file, "Shape");
    assert_eq!(shape.kind, TypeKind::Class);
    assert!(shape.is_abstract);
    assert_eq!(shape.access, AccessLevel::Public);

    let circle = find_type(&file, "Circle");
    assert!(circle.is_sealed);
    assert!(circle.is_partial);

    let helpers = find_type(&file, "Helpers");
    assert!(helpers.is_static);
    assert_eq!(helpers.access, AccessLevel::Internal);

    assert_eq!(find_type(&file, "IDrawable").kind, TypeKind::Interface);
    assert_eq!(find_type(&file, "Point").kind, TypeKind::Struct);

    let color = find_type(&file, "Color");
    assert_eq!(color.kind, TypeKind::Enum);
    assert_eq!(color.enum_members, vec!["Red", "Green", "Blue"]);

    // No modifier on a top-level type means internal
    assert_eq!(find_type(&file, "Hidden").access, AccessLevel::Internal);
}

#[test]
fn test_nested_types_follow_their_parent() {
    let code = r#"
namespace Shop
{
    public class Order
    {
        private class Line { }
        public enum State { Open, Closed }
        struct Totals { }
    }
}
"#;
    let file = parse(code);

    let names: Vec<_> = file.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Order", "Line", "State", "Totals"]);

    let line = find_type(&file, "Line");
    assert_eq!(line.parent_type.as_deref(), Some("Order"));
    assert_eq!(line.namespace, "Shop");
    assert_eq!(line.access, AccessLevel::Private);

    assert_eq!(find_type(&file, "State").access, AccessLevel::Public);
    // Nested types without a modifier are private
    assert_eq!(find_type(&file, "Totals").access, AccessLevel::Private);
    assert!(!find_type(&file, "Order").is_nested());
}

#[test]
fn test_base_list_relationships() {
    let code = r#"
public class OrderService : BaseService, IOrderService, IDisposable { }
public class Handler : IHandler { }
public interface IRepository<T> : IQueryable, IDisposable { }
public struct Money : IEquatable<Money> { }
public enum Flags : byte { None }
"#;
    let file = parse(code);

    let service = find_type(&file, "OrderService");
    let rels: Vec<_> = service
        .relationships
        .iter()
        .map(|r| (r.kind, r.target.as_str()))
        .collect();
    assert_eq!(
        rels,
        vec![
            (RelationshipKind::Inheritance, "BaseService"),
            (RelationshipKind::Implementation, "IOrderService"),
            (RelationshipKind::Implementation, "IDisposable"),
        ]
    );

    let handler = find_type(&file, "Handler");
    assert_eq!(handler.relationships[0].kind, RelationshipKind::Implementation);

    let repository = find_type(&file, "IRepository");
    assert!(repository
        .relationships
        .iter()
        .all(|r| r.kind == RelationshipKind::Inheritance));
    assert_eq!(repository.relationships.len(), 2);

    let money = find_type(&file, "Money");
    assert_eq!(money.relationships[0].kind, RelationshipKind::Implementation);
    assert_eq!(money.relationships[0].target, "IEquatable<Money>");

    assert!(find_type(&file, "Flags").relationships.is_empty());
}

#[test]
fn test_methods_and_parameters() {
    let code = r#"
public abstract class Calculator
{
    public Calculator(int seed) { }

    public static async Task<int> AddAsync(int a, int b = 2)
    {
        return a + b;
    }

    protected virtual void Reset() { }

    public override string ToString() => "calc";

    public abstract void Draw();

    void Helper() { }
}
"#;
    let file = parse(code);
    let calc = find_type(&file, "Calculator");
    let names: Vec<_> = calc.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Calculator", "AddAsync", "Reset", "ToString", "Draw", "Helper"]
    );

    let ctor = &calc.methods[0];
    assert_eq!(ctor.return_type, "Calculator");
    assert_eq!(ctor.parameters[0].name, "seed");

    let add = &calc.methods[1];
    assert_eq!(add.return_type, "Task<int>");
    assert!(add.is_static);
    assert!(add.is_async);
    assert_eq!(add.access, AccessLevel::Public);
    assert_eq!(add.parameters.len(), 2);
    assert_eq!(add.parameters[1].default_value.as_deref(), Some("2"));
    assert!(add.parameters[1].is_optional);
    assert!(add.start_line < add.end_line);
    assert_eq!(compact_signature(add), "pub s as Task<int> AddAsync(int a,int b=2)");

    assert!(calc.methods[2].is_virtual);
    assert_eq!(calc.methods[2].access, AccessLevel::Protected);
    assert!(calc.methods[3].is_override);
    assert!(calc.methods[4].is_abstract);

    // Class members without a modifier are private
    assert_eq!(calc.methods[5].access, AccessLevel::Private);
    assert_eq!(calc.methods[5].return_type, "void");
}

#[test]
fn test_parameter_modifiers() {
    let code = r#"
class Parser
{
    public bool TryParse(string text, out int value, ref int position, params object[] args)
    {
        value = 0;
        return true;
    }
}
"#;
    let file = parse(code);
    let method = &find_type(&file, "Parser").methods[0];
    let params = &method.parameters;

    assert_eq!(params.len(), 4);
    assert_eq!(params[0].type_name, "string");
    assert!(params[1].is_out);
    assert_eq!(params[1].type_name, "int");
    assert!(params[2].is_by_ref);
    assert_eq!(params[2].type_name, "int");
    assert!(params[3].is_params);
    assert_eq!(params[3].type_name, "object[]");
}

#[test]
fn test_interface_members_are_public() {
    let code = r#"
public interface IRepository
{
    Order Find(int id);
    string Name { get; }
}
"#;
    let file = parse(code);
    let repository = find_type(&file, "IRepository");

    assert_eq!(repository.methods[0].access, AccessLevel::Public);
    assert_eq!(repository.methods[0].return_type, "Order");

    let name = &repository.properties[0];
    assert_eq!(name.access, AccessLevel::Public);
    assert!(name.has_getter);
    assert!(!name.has_setter);
    assert!(!name.is_auto_implemented);
}

#[test]
fn test_properties() {
    let code = r#"
public class Customer
{
    public string Name { get; set; }
    public int Count { get; private set; }
    public string Display => Name;
    public int Total { get { return 1; } }
    public string Code { get; init; }
    public static Customer Empty { get; } = new Customer();
}
"#;
    let file = parse(code);
    let customer = find_type(&file, "Customer");
    let prop = |name: &str| {
        customer
            .properties
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("property {} not extracted", name))
    };

    let name = prop("Name");
    assert_eq!(name.type_name, "string");
    assert!(name.has_getter && name.has_setter);
    assert!(name.is_auto_implemented);
    assert!(!name.has_private_setter);

    assert!(prop("Count").has_private_setter);

    let display = prop("Display");
    assert!(display.has_getter);
    assert!(!display.has_setter);
    assert!(!display.is_auto_implemented);

    assert!(!prop("Total").is_auto_implemented);
    assert!(prop("Code").has_setter);
    assert!(prop("Empty").is_static);
}

#[test]
fn test_records() {
    let code = r#"
namespace People
{
    public record Person(string Name, int Age);
    public record struct Point(int X, int Y);
}
"#;
    let file = parse(code);

    let person = find_type(&file, "Person");
    assert_eq!(person.kind, TypeKind::Class);
    let props: Vec<_> = person
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.type_name.as_str()))
        .collect();
    assert_eq!(props, vec![("Name", "string"), ("Age", "int")]);
    assert!(person.properties.iter().all(|p| p.has_getter && p.is_auto_implemented));

    assert_eq!(find_type(&file, "Point").kind, TypeKind::Struct);
}

#[test]
fn test_documentation_comments() {
    let code = r#"
namespace Docs
{
    /// <summary>
    /// Handles orders.
    /// </summary>
    public class OrderHandler
    {
        /// <summary>Processes one order.</summary>
        /// <param name="id">Order id</param>
        public void Process(int id) { }

        // Not documentation
        public void Other() { }
    }

    public class Undocumented { }
}
"#;
    let file = parse(code);

    let handler = find_type(&file, "OrderHandler");
    assert_eq!(handler.documentation, "Handles orders.");
    assert_eq!(handler.methods[0].documentation, "Processes one order.\nOrder id");
    assert_eq!(handler.methods[1].documentation, "");
    assert_eq!(find_type(&file, "Undocumented").documentation, "");
}

#[test]
fn test_private_members_can_be_excluded() {
    let code = r#"
public class Vault
{
    private void Hidden() { }
    void Implicit() { }
    public void Shown() { }
    protected void Inherited() { }
    private int Secret { get; set; }
}
"#;
    let members = MemberFilter {
        private: false,
        ..MemberFilter::default()
    };
    let file = CSharpParser::with_member_filter(members)
        .parse(Path::new("Vault.cs"), code)
        .unwrap();
    let vault = find_type(&file, "Vault");

    let names: Vec<_> = vault.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Shown", "Inherited"]);
    assert!(vault.properties.is_empty());
}

const LAYERED_SOURCE: &str = r#"
public class Layered
{
    public void Open() { }
    protected void Family() { }
    internal void Assembly() { }
    protected internal void Either() { }
    private protected void Narrow() { }
    private void Hidden() { }
    internal int Count { get; set; }
}
"#;

fn kept_methods(members: MemberFilter) -> Vec<String> {
    let file = CSharpParser::with_member_filter(members)
        .parse(Path::new("Layered.cs"), LAYERED_SOURCE)
        .unwrap();
    find_type(&file, "Layered")
        .methods
        .iter()
        .map(|m| m.name.clone())
        .collect()
}

#[test]
fn test_member_filter_per_access_level() {
    let all = kept_methods(MemberFilter::default());
    assert_eq!(all, vec!["Open", "Family", "Assembly", "Either", "Narrow", "Hidden"]);

    let no_protected = kept_methods(MemberFilter {
        protected: false,
        ..MemberFilter::default()
    });
    assert_eq!(no_protected, vec!["Open", "Assembly", "Either", "Narrow", "Hidden"]);

    let no_internal = kept_methods(MemberFilter {
        internal: false,
        ..MemberFilter::default()
    });
    assert_eq!(no_internal, vec!["Open", "Family", "Either", "Narrow", "Hidden"]);
}

#[test]
fn test_protected_internal_needs_one_half_enabled() {
    let public_only = MemberFilter {
        private: false,
        protected: false,
        internal: false,
    };
    assert_eq!(kept_methods(public_only), vec!["Open", "Narrow"]);

    let file = CSharpParser::with_member_filter(public_only)
        .parse(Path::new("Layered.cs"), LAYERED_SOURCE)
        .unwrap();
    assert!(find_type(&file, "Layered").properties.is_empty());
}

#[test]
fn test_unrecoverable_syntax_is_rejected() {
    let result = CSharpParser::new().parse(Path::new("Broken.cs"), "@@@ %%% {{{ ]]] ");
    assert!(matches!(result, Err(ParseError::Syntax { .. })));
}

#[test]
fn test_empty_file_parses_to_nothing() {
    let file = parse("");
    assert!(file.types.is_empty());
    assert!(file.imports.is_empty());
}

#[test]
fn test_string_default_keeps_its_quotes() {
    let file = parse(
        r#"
public class Calc
{
    public static async Task<int> Compute(int x, string y = "a") => x;
}
"#,
    );
    let compute = &find_type(&file, "Calc").methods[0];

    assert_eq!(compute.parameters[1].default_value.as_deref(), Some("\"a\""));
    assert_eq!(
        compact_signature(compute),
        "pub s as Task<int> Compute(int x,string y=\"a\")"
    );
}
