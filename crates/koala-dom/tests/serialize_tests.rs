//! Tests for `Document::to_html` and `Document::dump` on hand-built trees.

use koala_dom::{DoctypeData, Document, ElementData, Namespace, NodeId, NodeType};

fn element(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let id = doc.create_element(ElementData::new(tag, Namespace::Html));
    doc.append_child(parent, id);
    id
}

fn text(doc: &mut Document, parent: NodeId, data: &str) -> NodeId {
    let id = doc.create_text(data);
    doc.append_child(parent, id);
    id
}

/// html > (head, body), returning (doc, body).
fn skeleton() -> (Document, NodeId) {
    let mut doc = Document::new();
    let html = element(&mut doc, NodeId::ROOT, "html");
    let _head = element(&mut doc, html, "head");
    let body = element(&mut doc, html, "body");
    (doc, body)
}

// ========== to_html ==========

#[test]
fn test_void_elements_have_no_end_tag() {
    let (mut doc, body) = skeleton();
    let _ = element(&mut doc, body, "br");
    let img = element(&mut doc, body, "img");
    if let Some(data) = doc.as_element_mut(img) {
        data.attrs.insert("src", "a.png");
    }

    let html = doc.to_html();
    assert_eq!(
        html,
        "<html><head></head><body><br><img src=\"a.png\"></body></html>"
    );
    assert!(!html.contains("</br>"));
}

#[test]
fn test_text_and_attribute_escaping() {
    let (mut doc, body) = skeleton();
    let a = element(&mut doc, body, "a");
    if let Some(data) = doc.as_element_mut(a) {
        data.attrs.insert("title", "\"Tom\" & <Jerry>\u{a0}");
    }
    let _ = text(&mut doc, a, "1 < 2 & 3 > \"2\"\u{a0}");

    assert_eq!(
        doc.inner_html(body),
        "<a title=\"&quot;Tom&quot; &amp; <Jerry>&nbsp;\">1 &lt; 2 &amp; 3 &gt; \"2\"&nbsp;</a>"
    );
}

#[test]
fn test_script_and_style_text_is_raw() {
    let (mut doc, body) = skeleton();
    let script = element(&mut doc, body, "script");
    let _ = text(&mut doc, script, "if (a < b && c) {}");
    let style = element(&mut doc, body, "style");
    let _ = text(&mut doc, style, "a > b { }");

    assert_eq!(
        doc.inner_html(body),
        "<script>if (a < b && c) {}</script><style>a > b { }</style>"
    );
}

#[test]
fn test_noscript_raw_only_with_scripting() {
    let (mut doc, body) = skeleton();
    let noscript = element(&mut doc, body, "noscript");
    let _ = text(&mut doc, noscript, "<p>");

    assert_eq!(doc.inner_html(body), "<noscript>&lt;p&gt;</noscript>");
    doc.set_scripting_enabled(true);
    assert_eq!(doc.inner_html(body), "<noscript><p></noscript>");
}

#[test]
fn test_pre_leading_newline_is_doubled() {
    let (mut doc, body) = skeleton();
    let pre = element(&mut doc, body, "pre");
    let _ = text(&mut doc, pre, "\nline");

    assert_eq!(doc.inner_html(body), "<pre>\n\nline</pre>");
}

#[test]
fn test_doctype_and_comment() {
    let mut doc = Document::new();
    let doctype = doc.alloc(NodeType::DocumentType(DoctypeData {
        name: "html".to_string(),
        ..DoctypeData::default()
    }));
    doc.append_child(NodeId::ROOT, doctype);
    let comment = doc.create_comment(" hi ");
    doc.append_child(NodeId::ROOT, comment);

    assert_eq!(doc.to_html(), "<!DOCTYPE html><!-- hi -->");
}

fn doctype_html(public_id: &str, system_id: &str) -> String {
    let mut doc = Document::new();
    let doctype = doc.alloc(NodeType::DocumentType(DoctypeData {
        name: "html".to_string(),
        public_id: public_id.to_string(),
        system_id: system_id.to_string(),
    }));
    doc.append_child(NodeId::ROOT, doctype);
    doc.to_html()
}

#[test]
fn test_doctype_keeps_identifiers() {
    assert_eq!(
        doctype_html("-//W3C//DTD HTML 4.01//EN", "http://www.w3.org/TR/html4/strict.dtd"),
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#
    );
    assert_eq!(
        doctype_html("-//W3C//DTD HTML 4.01 Transitional//EN", ""),
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#
    );
    assert_eq!(
        doctype_html("", "about:legacy-compat"),
        r#"<!DOCTYPE html SYSTEM "about:legacy-compat">"#
    );
}

#[test]
fn test_template_serializes_contents() {
    let (mut doc, body) = skeleton();
    let template = element(&mut doc, body, "template");
    let fragment = doc.alloc(NodeType::DocumentFragment);
    if let Some(data) = doc.as_element_mut(template) {
        data.template_contents = Some(fragment);
    }
    let _ = element(&mut doc, fragment, "td");

    assert_eq!(doc.inner_html(body), "<template><td></td></template>");
    assert_eq!(doc.inner_html(template), "<td></td>");
}

// ========== dump ==========

#[test]
fn test_dump_indents_two_spaces_per_depth() {
    let (mut doc, body) = skeleton();
    let p = element(&mut doc, body, "p");
    let _ = text(&mut doc, p, "hi\n\"there\"");

    assert_eq!(
        doc.dump(),
        "<html>\n  <head>\n  <body>\n    <p>\n      \"hi\\n\\\"there\\\"\"\n"
    );
}

#[test]
fn test_dump_sorts_attributes() {
    let (mut doc, body) = skeleton();
    let div = element(&mut doc, body, "div");
    if let Some(data) = doc.as_element_mut(div) {
        data.attrs.insert("id", "x");
        data.attrs.insert("class", "y");
    }

    let dump = doc.dump();
    assert!(dump.ends_with("    <div>\n      class=\"y\"\n      id=\"x\"\n"));
}

#[test]
fn test_dump_foreign_elements_and_attributes() {
    let (mut doc, body) = skeleton();
    let svg = doc.create_element(ElementData::new("svg", Namespace::Svg));
    doc.append_child(body, svg);
    let mut use_data = ElementData::new("use", Namespace::Svg);
    use_data.attrs.insert("xlink:href", "#a");
    use_data.attrs.insert("viewBox", "0 0 1 1");
    let use_el = doc.create_element(use_data);
    doc.append_child(svg, use_el);
    let math = doc.create_element(ElementData::new("math", Namespace::MathMl));
    doc.append_child(body, math);

    let dump = doc.dump();
    assert!(dump.contains("    <svg svg>\n      <svg use>\n        viewBox=\"0 0 1 1\"\n        xlink href=\"#a\"\n"));
    assert!(dump.contains("    <math math>\n"));
}

#[test]
fn test_dump_doctype_with_identifiers() {
    let mut doc = Document::new();
    let doctype = doc.alloc(NodeType::DocumentType(DoctypeData {
        name: "html".to_string(),
        public_id: "-//W3C//DTD HTML 4.01//EN".to_string(),
        system_id: String::new(),
    }));
    doc.append_child(NodeId::ROOT, doctype);

    assert_eq!(
        doc.dump(),
        "<!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"\">\n"
    );
}

#[test]
fn test_dump_template_content_line() {
    let (mut doc, body) = skeleton();
    let template = element(&mut doc, body, "template");
    let fragment = doc.alloc(NodeType::DocumentFragment);
    if let Some(data) = doc.as_element_mut(template) {
        data.template_contents = Some(fragment);
    }
    let _ = text(&mut doc, fragment, "x");

    assert!(doc.dump().ends_with("    <template>\n      content\n        \"x\"\n"));
}
