//! Integration tests for the HTML parser, written against the `Document`
//! query API: `body()`, `head()`, `text_content()` and friends.
//!
//! Exact tree shapes are checked with `dump()` in `tree_construction_tests.rs`.

use koala_dom::{Document, NodeId, NodeType, QuirksMode};
use koala_html::{ParseErrorKind, parse, parse_with_errors};

/// Tag names of the element children of `parent`, in order.
fn child_tags(doc: &Document, parent: NodeId) -> Vec<&str> {
    doc.children(parent)
        .iter()
        .filter_map(|&id| doc.as_element(id))
        .map(|data| data.tag_name.as_str())
        .collect()
}

/// Element children of `parent` whose tag name is `tag`.
fn children_named(doc: &Document, parent: NodeId, tag: &str) -> Vec<NodeId> {
    doc.children(parent)
        .iter()
        .copied()
        .filter(|&id| doc.as_element(id).is_some_and(|data| data.tag_name == tag))
        .collect()
}

/// First element named `tag` in tree order below `from`.
fn descendant(doc: &Document, from: NodeId, tag: &str) -> Option<NodeId> {
    doc.children(from).iter().find_map(|&id| {
        if doc.as_element(id).is_some_and(|data| data.tag_name == tag) {
            Some(id)
        } else {
            descendant(doc, id, tag)
        }
    })
}

fn body(doc: &Document) -> NodeId {
    doc.body().expect("document has a body")
}

fn attr<'a>(doc: &'a Document, id: NodeId, name: &str) -> Option<&'a str> {
    doc.as_element(id).and_then(|data| data.attrs.get(name))
}

// ---------------------------------------------------------------------------
// Document shape
// ---------------------------------------------------------------------------

#[test]
fn test_root_is_document_with_single_html_child() {
    let doc = parse("<!DOCTYPE html><html><head></head><body></body></html>");
    assert!(matches!(
        doc.get(doc.root()).map(|node| &node.node_type),
        Some(NodeType::Document)
    ));
    let html = doc.document_element().unwrap();
    assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
}

#[test]
fn test_missing_html_head_body_are_implied() {
    let doc = parse("Hello");
    let html = doc.document_element().unwrap();
    assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
    assert_eq!(doc.text_content(body(&doc)), "Hello");
}

#[test]
fn test_doctype_node_and_mode() {
    let doc = parse("<!DOCTYPE html><p>x");
    let first = doc.first_child(doc.root()).unwrap();
    let Some(NodeType::DocumentType(doctype)) = doc.get(first).map(|node| &node.node_type)
    else {
        panic!("first child should be the doctype");
    };
    assert_eq!(doctype.name, "html");
    assert!(doctype.public_id.is_empty() && doctype.system_id.is_empty());
    assert_eq!(doc.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_missing_doctype_means_quirks() {
    let (doc, errors) = parse_with_errors("<p>x");
    assert_eq!(doc.quirks_mode(), QuirksMode::Quirks);
    assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::MissingDoctype));
}

#[test]
fn test_html_attributes_are_merged_from_later_html_tag() {
    let doc = parse(r#"<html lang="en"><body><html lang="fr" dir="ltr">"#);
    let html = doc.document_element().unwrap();
    assert_eq!(attr(&doc, html, "lang"), Some("en"));
    assert_eq!(attr(&doc, html, "dir"), Some("ltr"));
}

// ---------------------------------------------------------------------------
// Text, comments, attributes
// ---------------------------------------------------------------------------

#[test]
fn test_character_tokens_become_one_text_node() {
    let doc = parse("<body>  a  b  </body>");
    let children = doc.children(body(&doc));
    assert_eq!(children.len(), 1);
    assert_eq!(doc.as_text(children[0]), Some("  a  b  "));
}

#[test]
fn test_character_references_are_decoded_in_text() {
    let doc = parse("<p>&lt;tag&gt; &amp; &copy; &#x41;&#66;</p>");
    let p = descendant(&doc, doc.root(), "p").unwrap();
    assert_eq!(doc.text_content(p), "<tag> & \u{a9} AB");
}

#[test]
fn test_comment_keeps_its_data() {
    let doc = parse("<body><!-- note --></body>");
    let comment = doc.first_child(body(&doc)).unwrap();
    assert!(matches!(
        doc.get(comment).map(|node| &node.node_type),
        Some(NodeType::Comment(data)) if data == " note "
    ));
}

#[test]
fn test_attribute_quoting_styles() {
    let doc = parse(r#"<div a="double" b='single' c=bare d></div>"#);
    let div = descendant(&doc, doc.root(), "div").unwrap();
    assert_eq!(attr(&doc, div, "a"), Some("double"));
    assert_eq!(attr(&doc, div, "b"), Some("single"));
    assert_eq!(attr(&doc, div, "c"), Some("bare"));
    assert_eq!(attr(&doc, div, "d"), Some(""));
}

#[test]
fn test_duplicate_attribute_keeps_first_value() {
    let (doc, errors) = parse_with_errors(r#"<!DOCTYPE html><p id="one" id="two">"#);
    let p = descendant(&doc, doc.root(), "p").unwrap();
    assert_eq!(attr(&doc, p, "id"), Some("one"));
    assert_eq!(
        errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
        vec![ParseErrorKind::DuplicateAttribute]
    );
}

// ---------------------------------------------------------------------------
// Head content
// ---------------------------------------------------------------------------

#[test]
fn test_head_elements_land_in_head() {
    let doc = parse(
        r#"<meta charset="utf-8"><title>T</title><link rel=x><style>p{}</style><p>body"#,
    );
    let head = doc.head().unwrap();
    assert_eq!(child_tags(&doc, head), vec!["meta", "title", "link", "style"]);
    assert_eq!(child_tags(&doc, body(&doc)), vec!["p"]);
}

#[test]
fn test_meta_after_body_content_stays_in_body() {
    let doc = parse("<p>x</p><meta charset=utf-8>");
    assert!(descendant(&doc, body(&doc), "meta").is_some());
    assert!(descendant(&doc, doc.head().unwrap(), "meta").is_none());
}

#[test]
fn test_style_content_is_raw_text() {
    let doc = parse("<style>a > b { color: red }<div>no</div></style>");
    let style = descendant(&doc, doc.root(), "style").unwrap();
    assert_eq!(doc.text_content(style), "a > b { color: red }<div>no</div>");
    assert!(descendant(&doc, body(&doc), "div").is_none());
}

#[test]
fn test_title_decodes_references_but_not_tags() {
    let doc = parse("<title>A <b> &amp; B</title>");
    let title = descendant(&doc, doc.root(), "title").unwrap();
    assert_eq!(doc.text_content(title), "A <b> & B");
}

#[test]
fn test_script_content_is_script_data() {
    let doc = parse("<script>if (a < b) { x = '</div>'; }</script>");
    let script = descendant(&doc, doc.head().unwrap(), "script").unwrap();
    assert_eq!(doc.text_content(script), "if (a < b) { x = '</div>'; }");
}

// ---------------------------------------------------------------------------
// In body: implied end tags and scope
// ---------------------------------------------------------------------------

#[test]
fn test_void_elements_do_not_nest() {
    let doc = parse("<input type=text><br><img src=a.png>text");
    assert_eq!(child_tags(&doc, body(&doc)), vec!["input", "br", "img"]);
    let br = descendant(&doc, body(&doc), "br").unwrap();
    assert!(doc.children(br).is_empty());
}

#[test]
fn test_new_p_closes_open_p() {
    let doc = parse("<p>first<p>second");
    let ps = children_named(&doc, body(&doc), "p");
    let texts: Vec<String> = ps.iter().map(|&p| doc.text_content(p)).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[test]
fn test_block_start_tag_closes_p() {
    let doc = parse("<p>a<div>b</div>");
    assert_eq!(child_tags(&doc, body(&doc)), vec!["p", "div"]);
}

#[test]
fn test_stray_p_end_tag_inserts_empty_p() {
    let (doc, errors) = parse_with_errors("<!DOCTYPE html><body></p>text");
    let ps = children_named(&doc, body(&doc), "p");
    assert_eq!(ps.len(), 1);
    assert!(doc.children(ps[0]).is_empty());
    assert_eq!(doc.text_content(body(&doc)), "text");
    assert_eq!(
        errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
        vec![ParseErrorKind::UnexpectedEndTag]
    );
}

#[test]
fn test_list_items_close_each_other() {
    let doc = parse("<ul><li>A<li>B</ul>");
    let ul = descendant(&doc, doc.root(), "ul").unwrap();
    let texts: Vec<String> = children_named(&doc, ul, "li")
        .iter()
        .map(|&li| doc.text_content(li))
        .collect();
    assert_eq!(texts, vec!["A", "B"]);
}

#[test]
fn test_definition_terms_close_each_other() {
    let doc = parse("<dl><dt>T<dd>D<dt>T2</dl>");
    let dl = descendant(&doc, doc.root(), "dl").unwrap();
    assert_eq!(child_tags(&doc, dl), vec!["dt", "dd", "dt"]);
    assert_eq!(doc.text_content(dl), "TDT2");
}

#[test]
fn test_nested_list_item_stays_in_inner_list() {
    let doc = parse("<ul><li>A<ul><li>B</ul></ul>");
    let outer = descendant(&doc, doc.root(), "ul").unwrap();
    let outer_items = children_named(&doc, outer, "li");
    assert_eq!(outer_items.len(), 1);
    let inner = descendant(&doc, outer_items[0], "ul").unwrap();
    assert_eq!(children_named(&doc, inner, "li").len(), 1);
}

#[test]
fn test_stray_list_end_tags_are_ignored() {
    let (doc, errors) = parse_with_errors("<!DOCTYPE html><body></li></ol>text");
    assert!(child_tags(&doc, body(&doc)).is_empty());
    assert_eq!(doc.text_content(body(&doc)), "text");
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_span_end_tag_does_not_cross_div() {
    let doc = parse("<span><div>text</span>more</div>");
    let span = descendant(&doc, body(&doc), "span").unwrap();
    let div = descendant(&doc, span, "div").unwrap();
    assert_eq!(doc.text_content(div), "textmore");
}

#[test]
fn test_heading_closes_open_heading() {
    let doc = parse("<h1>a<h2>b");
    assert_eq!(child_tags(&doc, body(&doc)), vec!["h1", "h2"]);
}

// ---------------------------------------------------------------------------
// Formatting elements
// ---------------------------------------------------------------------------

#[test]
fn test_misnested_inline_is_split() {
    let doc = parse("<p><b>X<i>Y</b>Z</i></p>");
    let p = descendant(&doc, doc.root(), "p").unwrap();
    assert_eq!(child_tags(&doc, p), vec!["b", "i"]);
    let b = children_named(&doc, p, "b")[0];
    let i_in_b = descendant(&doc, b, "i").unwrap();
    assert_eq!(doc.text_content(i_in_b), "Y");
    assert_eq!(doc.text_content(children_named(&doc, p, "i")[0]), "Z");
}

#[test]
fn test_end_tag_without_furthest_block_pops() {
    let doc = parse("<p><b><i>text</b>after</p>");
    let p = descendant(&doc, doc.root(), "p").unwrap();
    let b = children_named(&doc, p, "b")[0];
    assert_eq!(doc.text_content(b), "text");
    // The <i> was closed with <b> and is reconstructed for "after".
    let reopened = children_named(&doc, p, "i");
    assert_eq!(reopened.len(), 1);
    assert_eq!(doc.text_content(reopened[0]), "after");
}

#[test]
fn test_formatting_reopens_in_next_paragraph() {
    let doc = parse("<p><b>bold</p><p>still bold</p></b>");
    let ps = children_named(&doc, body(&doc), "p");
    assert_eq!(ps.len(), 2);
    for (&p, expected) in ps.iter().zip(["bold", "still bold"]) {
        let b = descendant(&doc, p, "b").unwrap();
        assert_eq!(doc.text_content(b), expected);
    }
}

#[test]
fn test_second_anchor_closes_first() {
    let doc = parse(r#"<a href="1">first<a href="2">second</a>"#);
    let anchors = children_named(&doc, body(&doc), "a");
    assert_eq!(anchors.len(), 2);
    assert_eq!(attr(&doc, anchors[0], "href"), Some("1"));
    assert_eq!(doc.text_content(anchors[0]), "first");
    assert_eq!(attr(&doc, anchors[1], "href"), Some("2"));
    assert_eq!(doc.text_content(anchors[1]), "second");
}

#[test]
fn test_reconstructed_element_copies_attributes() {
    let doc = parse(r#"<p><b class="x">1</p>2"#);
    let p = children_named(&doc, body(&doc), "p")[0];
    let inside = descendant(&doc, p, "b").unwrap();
    let reopened = children_named(&doc, body(&doc), "b")[0];
    assert_ne!(inside, reopened);
    for b in [inside, reopened] {
        assert_eq!(attr(&doc, b, "class"), Some("x"));
    }
    assert_eq!(doc.text_content(reopened), "2");
}

// ---------------------------------------------------------------------------
// Tables, templates, forms
// ---------------------------------------------------------------------------

#[test]
fn test_rows_are_wrapped_in_tbody() {
    let doc = parse("<table><tr><td>1</td></tr></table>");
    let table = descendant(&doc, doc.root(), "table").unwrap();
    assert_eq!(child_tags(&doc, table), vec!["tbody"]);
    let tbody = children_named(&doc, table, "tbody")[0];
    assert_eq!(doc.text_content(tbody), "1");
}

#[test]
fn test_foster_parented_div_precedes_table() {
    let doc = parse("<table><div>x</div><tr><td>y</td></tr></table>");
    assert_eq!(child_tags(&doc, body(&doc)), vec!["div", "table"]);
}

#[test]
fn test_template_children_live_in_contents() {
    let doc = parse("<template><p>a</p></template>");
    let template = descendant(&doc, doc.root(), "template").unwrap();
    assert!(doc.children(template).is_empty());
    let contents = doc.template_contents(template).unwrap();
    assert!(matches!(
        doc.get(contents).map(|node| &node.node_type),
        Some(NodeType::DocumentFragment)
    ));
    assert_eq!(child_tags(&doc, contents), vec!["p"]);
    assert!(descendant(&doc, body(&doc), "p").is_none());
}

#[test]
fn test_nested_form_is_ignored() {
    let (doc, errors) = parse_with_errors("<!DOCTYPE html><form id=a><form id=b><input></form>");
    let forms: Vec<NodeId> = children_named(&doc, body(&doc), "form");
    assert_eq!(forms.len(), 1);
    assert_eq!(attr(&doc, forms[0], "id"), Some("a"));
    assert!(descendant(&doc, forms[0], "input").is_some());
    assert!(errors.iter().any(|e| e.kind == ParseErrorKind::NestedForm));
}
