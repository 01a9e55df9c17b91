// Compact signature tests

use crate::model::{AccessLevel, Method, Parameter};
use crate::optimizer::signature::{abbreviate_access, compact_signature};

#[test]
fn test_static_async_method_with_default() {
    let mut method = Method::new("Compute", "Task<int>", AccessLevel::Public);
    method.is_static = true;
    method.is_async = true;
    method.parameters = vec![
        Parameter::new("x", "int"),
        Parameter::new("y", "string").with_default("\"a\""),
    ];

    assert_eq!(
        compact_signature(&method),
        "pub s as Task<int> Compute(int x,string y=\"a\")"
    );
}

#[test]
fn test_default_text_is_written_as_stored() {
    let mut method = Method::new("Compute", "Task<int>", AccessLevel::Public);
    method.is_static = true;
    method.is_async = true;
    method.parameters = vec![
        Parameter::new("x", "int"),
        Parameter::new("y", "string").with_default("a"),
    ];

    assert_eq!(compact_signature(&method), "pub s as Task<int> Compute(int x,string y=a)");
}

#[test]
fn test_flags_follow_fixed_order() {
    let mut method = Method::new("Run", "void", AccessLevel::Protected);
    method.is_override = true;
    method.is_abstract = true;
    method.is_virtual = true;
    method.is_static = true;

    assert_eq!(compact_signature(&method), "pro s a v o void Run()");
}

#[test]
fn test_parameter_modifiers() {
    let mut value = Parameter::new("value", "int");
    value.is_out = true;
    let mut position = Parameter::new("pos", "int");
    position.is_by_ref = true;
    let mut rest = Parameter::new("args", "object[]");
    rest.is_params = true;

    let mut method = Method::new("TryParse", "bool", AccessLevel::Private);
    method.parameters = vec![Parameter::new("text", "string"), value, position, rest];

    assert_eq!(
        compact_signature(&method),
        "prv bool TryParse(string text,out int value,ref int pos,params object[] args)"
    );
}

#[test]
fn test_optional_parameter_without_literal_defaults_to_null() {
    let mut param = Parameter::new("token", "CancellationToken");
    param.is_optional = true;

    let mut method = Method::new("Load", "Task", AccessLevel::Internal);
    method.parameters = vec![param];

    assert_eq!(
        compact_signature(&method),
        "int Task Load(CancellationToken token=null)"
    );
}

#[test]
fn test_access_abbreviations() {
    assert_eq!(abbreviate_access("public"), "pub");
    assert_eq!(abbreviate_access("private"), "prv");
    assert_eq!(abbreviate_access("protected"), "pro");
    assert_eq!(abbreviate_access("internal"), "int");
    assert_eq!(abbreviate_access("protected internal"), "pri");
    assert_eq!(abbreviate_access("private protected"), "private protected");
    assert_eq!(abbreviate_access("file"), "file");
}

#[test]
fn test_private_protected_is_written_in_full() {
    let method = Method::new("Reset", "void", AccessLevel::PrivateProtected);
    assert_eq!(compact_signature(&method), "private protected void Reset()");
}
