// Token optimizer tests

use crate::model::{TypeEntity, TypeKind};
use crate::optimizer::docs::MAX_DOC_CHARS;
use crate::optimizer::interner::ABSENT;
use crate::optimizer::{OPTIMIZATION_LEVEL, OptimizeError, StringInterner, TokenOptimizer};
use crate::tests::helpers::sample_codebase;

#[test]
fn test_optimize_leaves_input_untouched() {
    let codebase = sample_codebase();
    let before = codebase.clone();

    let mut interner = StringInterner::new();
    TokenOptimizer::new().optimize(&codebase, &mut interner).unwrap();

    assert_eq!(codebase, before);
}

#[test]
fn test_optimize_builds_string_table() {
    let codebase = sample_codebase();
    let mut interner = StringInterner::new();
    let indexed = TokenOptimizer::new().optimize(&codebase, &mut interner).unwrap();

    assert_eq!(indexed.optimization_level, OPTIMIZATION_LEVEL);
    assert_eq!(indexed.file_count, 2);
    assert_eq!(indexed.created_at, codebase.created_at);
    assert_eq!(indexed.resolve(indexed.root), Some("/repo"));
    assert_eq!(indexed.string_table, interner.export_table());

    // Shared strings appear once
    let system = indexed.string_table.iter().filter(|s| *s == "System").count();
    assert_eq!(system, 1);
    assert_eq!(indexed.files[0].imports[0], indexed.files[1].imports[0]);

    let order = &indexed.files[0].types[0];
    assert_eq!(indexed.resolve(order.fqn), Some("Shop.Orders.Order"));
    assert_eq!(indexed.resolve(order.kind), Some("class"));
    assert_eq!(indexed.resolve(order.access), Some("public"));
    assert_eq!(indexed.resolve(order.docs), Some("An order placed by a customer."));
    assert_eq!(order.parent, ABSENT);
    assert!(!order.is_nested);
}

#[test]
fn test_optimize_resolves_members_and_nesting() {
    let codebase = sample_codebase();
    let mut interner = StringInterner::new();
    let indexed = TokenOptimizer::new().optimize(&codebase, &mut interner).unwrap();

    let types = &indexed.files[0].types;
    let line = &types[1];
    assert!(line.is_nested);
    assert_eq!(indexed.resolve(line.parent), Some("Order"));
    assert_eq!(line.docs, ABSENT);

    let total = &types[0].methods[0];
    assert_eq!(indexed.resolve(total.sig), Some("pub decimal Total(decimal discount=0m)"));
    assert_eq!(indexed.resolve(total.params[0].default), Some("0m"));
    assert!(total.params[0].is_opt);
    assert_eq!((total.start, total.end), (10, 12));

    let status = &types[2];
    let members: Vec<_> = status.members.iter().map(|&id| indexed.resolve(id)).collect();
    assert_eq!(members, vec![Some("Open"), Some("Closed")]);

    let rel = &types[0].rels[0];
    assert_eq!(indexed.resolve(rel.kind), Some("inheritance"));
    assert_eq!(indexed.resolve(rel.target), Some("Entity"));
    assert_eq!(rel.desc, ABSENT);
}

#[test]
fn test_optimize_resets_interner_first() {
    let codebase = sample_codebase();
    let mut interner = StringInterner::new();
    interner.intern_or_lookup("left over from another session");

    let indexed = TokenOptimizer::new().optimize(&codebase, &mut interner).unwrap();
    assert_eq!(indexed.root, 1);
    assert!(!indexed.string_table.iter().any(|s| s.starts_with("left over")));
}

#[test]
fn test_optimize_is_deterministic() {
    let codebase = sample_codebase();
    let optimizer = TokenOptimizer::new();

    let mut first = StringInterner::new();
    let mut second = StringInterner::new();
    let a = optimizer.optimize(&codebase, &mut first).unwrap();
    let b = optimizer.optimize(&codebase, &mut second).unwrap();

    assert_eq!(a, b);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn test_optimize_rejects_invalid_graph() {
    let mut codebase = sample_codebase();
    codebase.files[0].types.push(TypeEntity::new("", "Shop", TypeKind::Class));

    let mut interner = StringInterner::new();
    let result = TokenOptimizer::new().optimize(&codebase, &mut interner);
    assert!(matches!(result, Err(OptimizeError::InvalidArgument(_))));
}

#[test]
fn test_in_place_normalizes_documentation() {
    let mut codebase = sample_codebase();
    codebase.files[1].types[0].methods[0].documentation = "x".repeat(MAX_DOC_CHARS + 50);

    let report = TokenOptimizer::new().optimize_in_place(&mut codebase).unwrap();

    assert_eq!(codebase.files[0].types[0].documentation, "An order placed by a customer.");
    let long = &codebase.files[1].types[0].methods[0].documentation;
    assert_eq!(long.chars().count(), MAX_DOC_CHARS);
    assert!(long.ends_with("..."));

    assert_eq!(report.types_processed, 4);
    assert_eq!(report.docs_rewritten, 2);
    assert_eq!(report.docs_truncated, 1);
    assert!(report.faults.is_empty());
}

#[test]
fn test_in_place_only_touches_documentation() {
    let mut codebase = sample_codebase();
    let before = codebase.clone();

    TokenOptimizer::new().optimize_in_place(&mut codebase).unwrap();

    assert_eq!(codebase.total_type_count(), before.total_type_count());
    assert_eq!(codebase.files[0].types[0].methods, before.files[0].types[0].methods);
    assert_eq!(codebase.files[0].types[0].properties, before.files[0].types[0].properties);
    assert_eq!(codebase.namespaces, before.namespaces);
}

#[test]
fn test_in_place_is_idempotent() {
    let mut codebase = sample_codebase();
    let optimizer = TokenOptimizer::new();

    optimizer.optimize_in_place(&mut codebase).unwrap();
    let once = codebase.clone();
    let report = optimizer.optimize_in_place(&mut codebase).unwrap();

    assert_eq!(codebase, once);
    assert_eq!(report.docs_rewritten, 0);
}

#[test]
fn test_in_place_rejects_invalid_graph_without_changes() {
    let mut codebase = sample_codebase();
    codebase.files[1]
        .types
        .push(TypeEntity::new("Broken", "Shop", TypeKind::Class).nested_in(" "));
    let before = codebase.clone();

    let result = TokenOptimizer::new().optimize_in_place(&mut codebase);
    assert!(matches!(result, Err(OptimizeError::InvalidArgument(_))));
    assert_eq!(codebase, before);
}
