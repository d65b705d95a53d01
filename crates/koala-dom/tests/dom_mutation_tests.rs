//! Tests for document mutation: remove_child, insert_before, move_children,
//! re-parenting and the document-level accessors.

use koala_dom::{
    AttributesMap, Document, ElementData, Namespace, NodeId, NodeType, QuirksMode, TextData,
};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(doc: &mut Document, tag: &str) -> NodeId {
    doc.create_element(ElementData::new(tag, Namespace::Html))
}

fn alloc_text(doc: &mut Document, data: &str) -> NodeId {
    doc.alloc(NodeType::Text(TextData {
        data: data.to_string(),
        mergeable: true,
    }))
}

// ========== remove_child ==========

#[test]
fn test_remove_only_child() {
    let mut doc = Document::new();
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut doc, "p");
    doc.append_child(parent, child);
    assert_eq!(doc.children(parent).len(), 1);

    doc.remove_child(parent, child);

    assert!(doc.children(parent).is_empty());
    assert_eq!(doc.parent(child), None);
    assert_eq!(doc.prev_sibling(child), None);
    assert_eq!(doc.next_sibling(child), None);
}

#[test]
fn test_remove_middle_child_relinks_siblings() {
    let mut doc = Document::new();
    let parent = alloc_element(&mut doc, "ul");
    doc.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut doc, "li");
    let b = alloc_element(&mut doc, "li");
    let c = alloc_element(&mut doc, "li");
    doc.append_child(parent, a);
    doc.append_child(parent, b);
    doc.append_child(parent, c);

    doc.remove_child(parent, b);

    assert_eq!(doc.children(parent), &[a, c]);
    assert_eq!(doc.next_sibling(a), Some(c));
    assert_eq!(doc.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_of_wrong_parent_is_noop() {
    let mut doc = Document::new();
    let first = alloc_element(&mut doc, "div");
    let second = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, first);
    doc.append_child(NodeId::ROOT, second);
    let child = alloc_element(&mut doc, "span");
    doc.append_child(first, child);

    doc.remove_child(second, child);

    assert_eq!(doc.parent(child), Some(first));
    assert_eq!(doc.children(first), &[child]);
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut doc = Document::new();
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut doc, "b");
    doc.append_child(parent, existing);

    let new_child = alloc_element(&mut doc, "a");
    doc.insert_before(parent, new_child, existing);

    assert_eq!(doc.children(parent), &[new_child, existing]);
    assert_eq!(doc.parent(new_child), Some(parent));
    assert_eq!(doc.prev_sibling(new_child), None);
    assert_eq!(doc.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut doc = Document::new();
    let parent = alloc_element(&mut doc, "div");
    let stranger = alloc_element(&mut doc, "span");
    doc.append_child(NodeId::ROOT, parent);
    let a = alloc_element(&mut doc, "a");
    doc.append_child(parent, a);

    let b = alloc_element(&mut doc, "b");
    doc.insert_before(parent, b, stranger);

    assert_eq!(doc.children(parent), &[a, b]);
}

// ========== re-parenting ==========

#[test]
fn test_append_moves_node_from_previous_parent() {
    let mut doc = Document::new();
    let table = alloc_element(&mut doc, "table");
    let body = alloc_element(&mut doc, "body");
    doc.append_child(NodeId::ROOT, body);
    doc.append_child(body, table);
    let text = alloc_text(&mut doc, "misplaced");
    doc.append_child(table, text);

    doc.insert_before(body, text, table);

    assert!(doc.children(table).is_empty());
    assert_eq!(doc.children(body), &[text, table]);
    assert_eq!(doc.parent(text), Some(body));
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut doc = Document::new();
    let from = alloc_element(&mut doc, "div");
    let to = alloc_element(&mut doc, "span");
    doc.append_child(NodeId::ROOT, from);
    doc.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut doc, "x");
    doc.append_child(to, existing);
    let a = alloc_element(&mut doc, "a");
    let b = alloc_element(&mut doc, "b");
    doc.append_child(from, a);
    doc.append_child(from, b);

    doc.move_children(from, to);

    assert!(doc.children(from).is_empty());
    assert_eq!(doc.children(to), &[existing, a, b]);
    assert_eq!(doc.parent(a), Some(to));
    assert_eq!(doc.parent(b), Some(to));
}

#[test]
fn test_move_children_empty_source() {
    let mut doc = Document::new();
    let from = alloc_element(&mut doc, "div");
    let to = alloc_element(&mut doc, "span");
    doc.append_child(NodeId::ROOT, from);
    doc.append_child(NodeId::ROOT, to);

    doc.move_children(from, to);

    assert!(doc.children(from).is_empty());
    assert!(doc.children(to).is_empty());
}

// ========== accessors ==========

#[test]
fn test_head_and_body_lookup() {
    let mut doc = Document::new();
    let html = alloc_element(&mut doc, "html");
    let head = alloc_element(&mut doc, "head");
    let body = alloc_element(&mut doc, "body");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, head);
    doc.append_child(html, body);

    assert_eq!(doc.document_element(), Some(html));
    assert_eq!(doc.head(), Some(head));
    assert_eq!(doc.body(), Some(body));
}

#[test]
fn test_svg_title_is_not_head() {
    let mut doc = Document::new();
    let html = alloc_element(&mut doc, "html");
    let foreign = doc.create_element(ElementData::new("head", Namespace::Svg));
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, foreign);

    assert_eq!(doc.head(), None);
}

#[test]
fn test_ancestors_and_descendant_check() {
    let mut doc = Document::new();
    let html = alloc_element(&mut doc, "html");
    let body = alloc_element(&mut doc, "body");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, body);
    doc.append_child(body, p);

    let chain: Vec<NodeId> = doc.ancestors(p).collect();
    assert_eq!(chain, vec![body, html, NodeId::ROOT]);
    assert!(doc.is_descendant_of(p, html));
    assert!(!doc.is_descendant_of(html, p));
}

#[test]
fn test_text_content_concatenates_in_tree_order() {
    let mut doc = Document::new();
    let p = alloc_element(&mut doc, "p");
    let b = alloc_element(&mut doc, "b");
    doc.append_child(NodeId::ROOT, p);
    let one = alloc_text(&mut doc, "one ");
    let two = alloc_text(&mut doc, "two");
    let three = alloc_text(&mut doc, " three");
    doc.append_child(p, one);
    doc.append_child(p, b);
    doc.append_child(b, two);
    doc.append_child(p, three);

    assert_eq!(doc.text_content(p), "one two three");
}

#[test]
fn test_template_contents_are_detached_fragment() {
    let mut doc = Document::new();
    let template = alloc_element(&mut doc, "template");
    doc.append_child(NodeId::ROOT, template);
    let fragment = doc.alloc(NodeType::DocumentFragment);
    if let Some(data) = doc.as_element_mut(template) {
        data.template_contents = Some(fragment);
    }

    assert_eq!(doc.template_contents(template), Some(fragment));
    assert_eq!(doc.parent(fragment), None);
    assert!(doc.children(template).is_empty());
}

#[test]
fn test_quirks_mode_defaults_to_no_quirks() {
    let mut doc = Document::new();
    assert_eq!(doc.quirks_mode(), QuirksMode::NoQuirks);
    doc.set_quirks_mode(QuirksMode::LimitedQuirks);
    assert_eq!(doc.quirks_mode(), QuirksMode::LimitedQuirks);
    assert_eq!(doc.quirks_mode().to_string(), "limited-quirks");
}

#[test]
fn test_attributes_keep_insertion_order_and_first_value() {
    let attrs: AttributesMap = [("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
    let names: Vec<&str> = attrs.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(attrs.get("b"), Some("1"));

    let mut attrs = attrs;
    assert!(!attrs.insert_if_absent("a", "9"));
    assert!(attrs.insert_if_absent("c", "4"));
    assert_eq!(attrs.get("a"), Some("2"));
    assert_eq!(attrs.len(), 3);
}
