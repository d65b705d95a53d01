//! Integration tests for named character reference lookup.

use koala_html::tokenizer::named_character_references::{
    any_entity_has_prefix, is_legacy, longest_match, lookup_entity,
};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("a")); // amp, apos, alpha, etc.
    assert!(any_entity_has_prefix("am")); // amp
    assert!(any_entity_has_prefix("amp")); // amp, amp;
    assert!(any_entity_has_prefix("amp;")); // amp;
    assert!(!any_entity_has_prefix("ampx")); // nothing
    assert!(!any_entity_has_prefix("xyz")); // nothing
}

#[test]
fn test_longest_match_prefers_full_name() {
    assert_eq!(longest_match("notin;"), Some((6, "\u{2209}")));
    // "not" is a legacy name, so it is the longest match for "notit;".
    assert_eq!(longest_match("notit;"), Some((3, "\u{00AC}")));
    assert_eq!(longest_match("amp;rest"), Some((4, "&")));
    assert_eq!(longest_match("xyz;"), None);
}

#[test]
fn test_longest_match_counts_characters() {
    assert_eq!(longest_match("lt\u{e9}"), Some((2, "<")));
}

#[test]
fn test_legacy_names() {
    assert!(is_legacy("amp"));
    assert!(is_legacy("copy"));
    assert!(!is_legacy("amp;"));
    assert!(!is_legacy("notin"));
}
