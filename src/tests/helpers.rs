//! Fixtures shared across test modules

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::model::{
    AccessLevel, Codebase, Method, Parameter, Property, Relationship, RelationshipKind,
    SourceFile, TypeEntity, TypeKind,
};

/// Two files, four types: a class with a nested struct, an enum and an interface
pub fn sample_codebase() -> Codebase {
    let mut order = TypeEntity::new("Order", "Shop.Orders", TypeKind::Class);
    order.access = AccessLevel::Public;
    order.documentation = "An order\n    placed by a customer.".to_string();
    order
        .relationships
        .push(Relationship::new(RelationshipKind::Inheritance, "Entity"));

    let mut total = Method::new("Total", "decimal", AccessLevel::Public);
    total
        .parameters
        .push(Parameter::new("discount", "decimal").with_default("0m"));
    total.start_line = 10;
    total.end_line = 12;
    order.methods.push(total);

    let mut id = Property::new("Id", "int", AccessLevel::Public);
    id.has_getter = true;
    id.has_setter = true;
    id.is_auto_implemented = true;
    id.start_line = 8;
    id.end_line = 8;
    order.properties.push(id);

    let line = TypeEntity::new("Line", "Shop.Orders", TypeKind::Struct).nested_in("Order");

    let mut status = TypeEntity::new("Status", "Shop.Orders", TypeKind::Enum);
    status.access = AccessLevel::Public;
    status.enum_members = vec!["Open".to_string(), "Closed".to_string()];

    let mut repository = TypeEntity::new("IOrderRepository", "Shop.Data", TypeKind::Interface);
    repository.access = AccessLevel::Public;
    let mut find = Method::new("Find", "Order", AccessLevel::Public);
    find.parameters.push(Parameter::new("id", "int"));
    find.start_line = 7;
    find.end_line = 7;
    repository.methods.push(find);

    let mut orders = SourceFile::new("/repo/src/Order.cs", "csharp");
    orders.relative_path = "src/Order.cs".to_string();
    orders.size = 420;
    orders.namespaces = vec!["Shop.Orders".to_string()];
    orders.imports = vec!["System".to_string()];
    orders.types = vec![order, line, status];

    let mut data = SourceFile::new("/repo/src/Data/IOrderRepository.cs", "csharp");
    data.relative_path = "src/Data/IOrderRepository.cs".to_string();
    data.size = 180;
    data.namespaces = vec!["Shop.Data".to_string()];
    data.imports = vec!["System".to_string(), "Shop.Orders".to_string()];
    data.types = vec![repository];

    Codebase::from_files("/repo", vec![orders, data])
}

/// One file whose entities set every optional field and every flag
pub fn fully_flagged_codebase() -> Codebase {
    let mut handler = TypeEntity::new("Handler", "Shop.Events", TypeKind::Class);
    handler.access = AccessLevel::ProtectedInternal;
    handler.is_static = true;
    handler.is_abstract = true;
    handler.is_sealed = true;
    handler.is_partial = true;
    handler.documentation = "Handles events.".to_string();
    let mut implements = Relationship::new(RelationshipKind::Implementation, "IHandler");
    implements.description = Some("event contract".to_string());
    handler.relationships.push(implements);

    let mut handle = Method::new("Handle", "Task<bool>", AccessLevel::PrivateProtected);
    handle.is_static = true;
    handle.is_virtual = true;
    handle.is_override = true;
    handle.is_abstract = true;
    handle.is_async = true;
    handle.documentation = "Runs the handler.".to_string();
    let mut by_ref = Parameter::new("state", "int");
    by_ref.is_by_ref = true;
    let mut out = Parameter::new("result", "string");
    out.is_out = true;
    let mut rest = Parameter::new("args", "object[]");
    rest.is_params = true;
    let mut token = Parameter::new("token", "CancellationToken").with_default("default");
    token.is_optional = true;
    handle.parameters = vec![by_ref, out, rest, token];
    handle.start_line = 5;
    handle.end_line = 9;
    handler.methods.push(handle);

    let mut name = Property::new("Name", "string", AccessLevel::Protected);
    name.is_static = true;
    name.is_virtual = true;
    name.is_override = true;
    name.is_abstract = true;
    name.has_getter = true;
    name.has_setter = true;
    name.has_private_setter = true;
    name.is_auto_implemented = true;
    name.documentation = "Display name.".to_string();
    name.start_line = 3;
    name.end_line = 3;
    handler.properties.push(name);

    let inner = TypeEntity::new("Inner", "Shop.Events", TypeKind::Struct).nested_in("Handler");

    let mut file = SourceFile::new("/repo/Events/Handler.cs", "csharp");
    file.relative_path = "Events/Handler.cs".to_string();
    file.size = 512;
    file.last_modified = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    file.namespaces = vec!["Shop.Events".to_string()];
    file.imports = vec!["System.Threading".to_string()];
    file.types = vec![handler, inner];

    Codebase::from_files("/repo", vec![file])
}

/// Write `content` to `root/relative`, creating directories on the way
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub const ORDER_SOURCE: &str = r#"using System;
using System.Collections.Generic;

namespace Shop.Models
{
    /// <summary>
    /// A customer order.
    /// </summary>
    public class Order : Entity, IComparable<Order>
    {
        public int Id { get; set; }

        public List<string> Lines { get; private set; }

        public decimal Total(decimal discount = 0m)
        {
            return 0m;
        }

        public int CompareTo(Order other) => Id.CompareTo(other.Id);
    }

    public enum OrderStatus
    {
        Open,
        Closed
    }
}
"#;

pub const SERVICE_SOURCE: &str = r#"using Shop.Models;

namespace Shop.Services;

public interface IOrderService
{
    Order Find(int id);
}

internal sealed class OrderService : IOrderService
{
    private readonly Dictionary<int, Order> _orders = new();

    public Order Find(int id) => _orders[id];

    private void Audit(string message) { }
}
"#;
