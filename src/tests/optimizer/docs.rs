// Documentation normalization tests

use crate::optimizer::docs::{ELLIPSIS, MAX_DOC_CHARS, normalize_documentation};

#[test]
fn test_text_at_the_cap_is_kept() {
    let text = "a".repeat(MAX_DOC_CHARS);
    assert_eq!(normalize_documentation(&text), text);
}

#[test]
fn test_text_over_the_cap_is_cut_with_ellipsis() {
    let text = "b".repeat(MAX_DOC_CHARS + 1);
    let result = normalize_documentation(&text);

    assert_eq!(result.chars().count(), MAX_DOC_CHARS);
    assert!(result.ends_with(ELLIPSIS));
    assert_eq!(&result[..197], "b".repeat(197));
}

#[test]
fn test_cap_applies_after_whitespace_collapse() {
    // 150 words of "ab" separated by runs of spaces: 449 chars collapsed
    let spaced = vec!["ab"; 150].join("      ");
    let result = normalize_documentation(&spaced);
    assert_eq!(result.chars().count(), MAX_DOC_CHARS);

    // Short once collapsed, so nothing is cut
    let short = vec!["ab"; 10].join("\n\n\t  ");
    assert_eq!(normalize_documentation(&short), vec!["ab"; 10].join(" "));
}

#[test]
fn test_normalization_is_idempotent() {
    let inputs = [
        String::new(),
        "  Summary\n  with   lines  ".to_string(),
        "word ".repeat(100),
        "ü ".repeat(150),
    ];
    for input in inputs {
        let once = normalize_documentation(&input);
        assert_eq!(normalize_documentation(&once), once, "input: {:?}", input);
    }
}
