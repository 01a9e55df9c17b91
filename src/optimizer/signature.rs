//! Compact one-line method signatures
//!
//! `public static async Task<int> Compute(int x, string y = "a")` becomes
//! `pub s as Task<int> Compute(int x,string y="a")`.

use crate::model::{Method, Parameter};

/// Short token for an access level; unknown values pass through unchanged
pub fn abbreviate_access(access: &str) -> &str {
    match access {
        "public" => "pub",
        "private" => "prv",
        "protected" => "pro",
        "internal" => "int",
        "protected internal" => "pri",
        other => other,
    }
}

pub fn compact_signature(method: &Method) -> String {
    let mut sig = String::from(abbreviate_access(method.access.as_str()));

    // Fixed order: static, abstract, virtual, override, async
    let flags = [
        (method.is_static, "s"),
        (method.is_abstract, "a"),
        (method.is_virtual, "v"),
        (method.is_override, "o"),
        (method.is_async, "as"),
    ];
    for (set, token) in flags {
        if set {
            sig.push(' ');
            sig.push_str(token);
        }
    }

    sig.push(' ');
    sig.push_str(&method.return_type);
    sig.push(' ');
    sig.push_str(&method.name);

    sig.push('(');
    let params: Vec<String> = method.parameters.iter().map(compact_parameter).collect();
    sig.push_str(&params.join(","));
    sig.push(')');

    sig
}

fn compact_parameter(param: &Parameter) -> String {
    // out, ref and params are mutually exclusive; checked in that order
    let prefix = if param.is_out {
        "out "
    } else if param.is_by_ref {
        "ref "
    } else if param.is_params {
        "params "
    } else {
        ""
    };

    let mut rendered = format!("{}{} {}", prefix, param.type_name, param.name);
    if param.is_optional {
        rendered.push('=');
        rendered.push_str(param.default_value.as_deref().unwrap_or("null"));
    }
    rendered
}
