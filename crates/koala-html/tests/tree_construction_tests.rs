//! Tree construction tests against the canonical tree dump.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

use koala_dom::QuirksMode;
use koala_html::{
    ParseErrorKind, ParseOptions, parse, parse_fragment, parse_with_errors, parse_with_options,
};

/// Dump of `input` parsed as a full document.
fn dump(input: &str) -> String {
    parse(input).dump()
}

/// Error kinds produced while parsing `input`, in order.
fn error_kinds(input: &str) -> Vec<ParseErrorKind> {
    parse_with_errors(input)
        .1
        .into_iter()
        .map(|error| error.kind)
        .collect()
}

/// Wrap body-level dump lines in the implied `html`/`head`/`body` skeleton.
fn in_body(lines: &str) -> String {
    format!("<html>\n  <head>\n  <body>\n{lines}")
}

// ---------------------------------------------------------------------------
// Implied structure
// ---------------------------------------------------------------------------

#[test]
fn empty_input_builds_the_skeleton() {
    assert_eq!(dump(""), "<html>\n  <head>\n  <body>\n");
}

#[test]
fn doctype_is_dumped_before_html() {
    assert_eq!(
        dump("<!DOCTYPE html>"),
        "<!DOCTYPE html>\n<html>\n  <head>\n  <body>\n"
    );
}

#[test]
fn doctype_with_identifiers_is_quoted() {
    let input = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#;
    assert!(dump(input).starts_with(
        "<!DOCTYPE html \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n"
    ));
}

#[test]
fn comment_after_html_end_is_a_document_child() {
    assert_eq!(
        dump("<!DOCTYPE html><html></html><!--x-->"),
        "<!DOCTYPE html>\n<html>\n  <head>\n  <body>\n<!-- x -->\n"
    );
}

#[test]
fn comment_after_body_end_is_appended_to_html() {
    assert_eq!(
        dump("<body></body><!--y-->"),
        "<html>\n  <head>\n  <body>\n  <!-- y -->\n"
    );
}

#[test]
fn frameset_replaces_body() {
    assert_eq!(
        dump("<frameset><frame></frameset>"),
        "<html>\n  <head>\n  <frameset>\n    <frame>\n"
    );
}

#[test]
fn attributes_are_sorted_one_per_line() {
    assert_eq!(
        dump(r#"<div id="a" class="b"></div>"#),
        in_body("    <div>\n      class=\"b\"\n      id=\"a\"\n")
    );
}

// ---------------------------------------------------------------------------
// In body
// ---------------------------------------------------------------------------

#[test]
fn misnested_formatting_elements_are_adopted() {
    assert_eq!(
        dump("<b>1<i>2</b>3</i>"),
        in_body(concat!(
            "    <b>\n",
            "      \"1\"\n",
            "      <i>\n",
            "        \"2\"\n",
            "    <i>\n",
            "      \"3\"\n",
        ))
    );
}

#[test]
fn formatting_element_is_moved_into_furthest_block() {
    assert_eq!(
        dump("<a>1<p>2</a>3</p>"),
        in_body(concat!(
            "    <a>\n",
            "      \"1\"\n",
            "    <p>\n",
            "      <a>\n",
            "        \"2\"\n",
            "      \"3\"\n",
        ))
    );
}

#[test]
fn noahs_ark_limits_identical_formatting_elements() {
    assert_eq!(
        dump("<p><b><b><b><b>x</p>y"),
        in_body(concat!(
            "    <p>\n",
            "      <b>\n",
            "        <b>\n",
            "          <b>\n",
            "            <b>\n",
            "              \"x\"\n",
            "    <b>\n",
            "      <b>\n",
            "        <b>\n",
            "          \"y\"\n",
        ))
    );
}

#[test]
fn leading_newline_in_pre_is_dropped() {
    assert_eq!(dump("<pre>\nx</pre>"), in_body("    <pre>\n      \"x\"\n"));
}

#[test]
fn textarea_content_is_rcdata() {
    assert_eq!(
        dump("<textarea>\n<b>x</textarea>"),
        in_body("    <textarea>\n      \"<b>x\"\n")
    );
}

#[test]
fn image_start_tag_becomes_img() {
    assert_eq!(dump("<image src=a>"), in_body("    <img>\n      src=\"a\"\n"));
}

#[test]
fn stray_br_end_tag_inserts_br() {
    assert_eq!(dump("</br>"), in_body("    <br>\n"));
}

#[test]
fn plaintext_swallows_the_rest_of_the_input() {
    assert_eq!(
        dump("<plaintext><b>x</b>"),
        in_body("    <plaintext>\n      \"<b>x</b>\"\n")
    );
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[test]
fn table_text_is_foster_parented_and_merged() {
    assert_eq!(
        dump("A<table>B</table>"),
        in_body("    \"AB\"\n    <table>\n")
    );
}

#[test]
fn rows_get_an_implied_tbody() {
    assert_eq!(
        dump("<table><tr><td>1</td></tr></table>"),
        in_body(concat!(
            "    <table>\n",
            "      <tbody>\n",
            "        <tr>\n",
            "          <td>\n",
            "            \"1\"\n",
        ))
    );
}

#[test]
fn misplaced_element_is_foster_parented_before_table() {
    assert_eq!(
        dump("<table><div>x</div><tr><td>y</table>"),
        in_body(concat!(
            "    <div>\n",
            "      \"x\"\n",
            "    <table>\n",
            "      <tbody>\n",
            "        <tr>\n",
            "          <td>\n",
            "            \"y\"\n",
        ))
    );
}

#[test]
fn caption_and_col_get_their_containers() {
    assert_eq!(
        dump("<table><caption>c</caption><col><tr><td>1</table>"),
        in_body(concat!(
            "    <table>\n",
            "      <caption>\n",
            "        \"c\"\n",
            "      <colgroup>\n",
            "        <col>\n",
            "      <tbody>\n",
            "        <tr>\n",
            "          <td>\n",
            "            \"1\"\n",
        ))
    );
}

#[test]
fn cell_start_tag_closes_select_in_table() {
    assert_eq!(
        dump("<table><tr><td><select><option>x<td>y</table>"),
        in_body(concat!(
            "    <table>\n",
            "      <tbody>\n",
            "        <tr>\n",
            "          <td>\n",
            "            <select>\n",
            "              <option>\n",
            "                \"x\"\n",
            "          <td>\n",
            "            \"y\"\n",
        ))
    );
}

#[test]
fn hidden_input_stays_inside_table() {
    assert_eq!(
        dump("<table><input type=hidden></table>"),
        in_body("    <table>\n      <input>\n        type=\"hidden\"\n")
    );
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[test]
fn template_contents_are_dumped_under_content() {
    assert_eq!(
        dump("<template><p>a</p></template>"),
        concat!(
            "<html>\n",
            "  <head>\n",
            "    <template>\n",
            "      content\n",
            "        <p>\n",
            "          \"a\"\n",
            "  <body>\n",
        )
    );
}

#[test]
fn template_in_body_accepts_table_rows() {
    assert_eq!(
        dump("<body><template><tr><td>1</td></tr></template>"),
        in_body(concat!(
            "    <template>\n",
            "      content\n",
            "        <tr>\n",
            "          <td>\n",
            "            \"1\"\n",
        ))
    );
}

// ---------------------------------------------------------------------------
// Foreign content
// ---------------------------------------------------------------------------

#[test]
fn svg_names_are_case_adjusted() {
    assert_eq!(
        dump(r#"<svg viewbox="0 0 1 1"><foreignobject><p>x</p></foreignobject><lineargradient/></svg>"#),
        in_body(concat!(
            "    <svg svg>\n",
            "      viewBox=\"0 0 1 1\"\n",
            "      <svg foreignObject>\n",
            "        <p>\n",
            "          \"x\"\n",
            "      <svg linearGradient>\n",
        ))
    );
}

#[test]
fn mathml_annotation_xml_with_html_encoding_hosts_html() {
    assert_eq!(
        dump(r#"<math><mi>x</mi><annotation-xml encoding="text/html"><div>y</div></annotation-xml></math>"#),
        in_body(concat!(
            "    <math math>\n",
            "      <math mi>\n",
            "        \"x\"\n",
            "      <math annotation-xml>\n",
            "        encoding=\"text/html\"\n",
            "        <div>\n",
            "          \"y\"\n",
        ))
    );
}

#[test]
fn html_start_tag_breaks_out_of_svg() {
    assert_eq!(
        dump("<svg><p>x"),
        in_body("    <svg svg>\n    <p>\n      \"x\"\n")
    );
}

#[test]
fn xlink_attributes_are_namespaced() {
    assert_eq!(
        dump(r##"<svg><a xlink:href="#x"/></svg>"##),
        in_body("    <svg svg>\n      <svg a>\n        xlink href=\"#x\"\n")
    );
}

#[test]
fn cdata_is_text_inside_svg() {
    assert_eq!(
        dump("<svg><![CDATA[a<b]]></svg>"),
        in_body("    <svg svg>\n      \"a<b\"\n")
    );
}

// ---------------------------------------------------------------------------
// Quirks
// ---------------------------------------------------------------------------

#[test]
fn quirks_mode_table_stays_inside_p() {
    assert_eq!(
        dump("<p><table>"),
        in_body("    <p>\n      <table>\n")
    );
}

#[test]
fn no_quirks_table_closes_p() {
    assert_eq!(
        dump("<!DOCTYPE html><p><table>"),
        "<!DOCTYPE html>\n<html>\n  <head>\n  <body>\n    <p>\n    <table>\n"
    );
}

#[test]
fn document_mode_follows_doctype() {
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(parse("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#)
            .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#).quirks_mode(),
        QuirksMode::Quirks
    );
}

// ---------------------------------------------------------------------------
// Scripting flag
// ---------------------------------------------------------------------------

#[test]
fn noscript_is_raw_text_when_scripting() {
    let options = ParseOptions::new().with_scripting(true);
    let (document, _) = parse_with_options("<noscript><p>x", &options);
    assert_eq!(
        document.dump(),
        "<html>\n  <head>\n    <noscript>\n      \"<p>x\"\n  <body>\n"
    );
}

#[test]
fn noscript_is_parsed_when_not_scripting() {
    assert_eq!(
        dump("<noscript><p>x"),
        "<html>\n  <head>\n    <noscript>\n  <body>\n    <p>\n      \"x\"\n"
    );
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

#[test]
fn fragment_in_table_cell() {
    let (document, _) = parse_fragment("<b>x</b>", "td");
    assert_eq!(document.dump(), "<html>\n  <b>\n    \"x\"\n");
}

#[test]
fn fragment_in_textarea_is_text() {
    let (document, _) = parse_fragment("<b>x</b>", "textarea");
    assert_eq!(document.dump(), "<html>\n  \"<b>x</b>\"\n");
}

#[test]
fn fragment_in_svg_context_is_foreign() {
    let (document, _) = parse_fragment("<circle/>", "svg svg");
    assert_eq!(document.dump(), "<html>\n  <svg circle>\n");
}

#[test]
fn fragment_in_select_drops_disallowed_tags() {
    let (document, _) = parse_fragment("<option>a<div>b</div>", "select");
    assert_eq!(document.dump(), "<html>\n  <option>\n    \"ab\"\n");
}

#[test]
fn adoption_agency_stops_after_eight_outer_iterations() {
    let input = format!("<!DOCTYPE html><b>{}x</b>", "<div>".repeat(12));
    let (document, errors) = parse_with_errors(&input);
    let kinds: Vec<ParseErrorKind> = errors.iter().map(|error| error.kind).collect();
    assert!(kinds.contains(&ParseErrorKind::AdoptionAgencyBound));

    // Each outer iteration moves one div out of the current <b> and leaves an
    // empty clone behind; the last four divs stay inside the eighth clone.
    let line = |depth: usize, text: &str| format!("{}{text}\n", "  ".repeat(depth));
    let mut expected = String::from("<!DOCTYPE html>\n<html>\n  <head>\n  <body>\n");
    expected.push_str(&line(2, "<b>"));
    for depth in 2..9 {
        expected.push_str(&line(depth, "<div>"));
        expected.push_str(&line(depth + 1, "<b>"));
    }
    expected.push_str(&line(9, "<div>"));
    expected.push_str(&line(10, "<b>"));
    for depth in 11..15 {
        expected.push_str(&line(depth, "<div>"));
    }
    expected.push_str(&line(15, "\"x\""));
    assert_eq!(document.dump(), expected);
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[test]
fn conforming_document_has_no_errors() {
    assert!(error_kinds("<!DOCTYPE html><p>x").is_empty());
}

#[test]
fn missing_doctype_is_the_first_error() {
    assert_eq!(error_kinds("x").first(), Some(&ParseErrorKind::MissingDoctype));
}

#[test]
fn stray_end_tag_before_html() {
    assert_eq!(
        error_kinds("<!DOCTYPE html></div>"),
        vec![ParseErrorKind::UnexpectedEndTag]
    );
}

#[test]
fn nested_form_is_reported() {
    assert!(error_kinds("<!DOCTYPE html><form><form>").contains(&ParseErrorKind::NestedForm));
}

#[test]
fn text_in_table_is_reported_once() {
    assert_eq!(
        error_kinds("<!DOCTYPE html><table>xyz</table>"),
        vec![ParseErrorKind::MisplacedCharacter]
    );
}

#[test]
fn self_closing_non_void_element_is_reported() {
    assert_eq!(
        error_kinds("<!DOCTYPE html><div/></div>"),
        vec![ParseErrorKind::NonVoidHtmlElementStartTagWithTrailingSolidus]
    );
}

#[test]
fn self_closing_void_element_is_acknowledged() {
    assert!(error_kinds("<!DOCTYPE html><br/><img/>").is_empty());
}

#[test]
fn body_end_tag_with_open_div() {
    assert_eq!(
        error_kinds("<!DOCTYPE html><div></body>"),
        vec![ParseErrorKind::EndTagWithUnclosedElements]
    );
}

#[test]
fn eof_with_open_div() {
    assert_eq!(
        error_kinds("<!DOCTYPE html><div>"),
        vec![ParseErrorKind::UnexpectedEof]
    );
}

#[test]
fn tokenizer_and_tree_errors_interleave_in_order() {
    assert_eq!(
        error_kinds("<!DOCTYPE html><p a=1 a=2></p></p>"),
        vec![
            ParseErrorKind::DuplicateAttribute,
            ParseErrorKind::UnexpectedEndTag
        ]
    );
}

#[test]
fn error_offsets_point_into_the_input() {
    let (_, errors) = parse_with_errors("<!DOCTYPE html></div>");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].offset > 0 && errors[0].offset <= 21);
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn serialized_tree_reparses_to_the_same_dump() {
    for input in [
        "<!DOCTYPE html><p>a<b>b<i>c</b>d</i>",
        "<table><tr><td>1<td>2</table>",
        "<template><p>x</p></template><svg><circle r=1/></svg>",
        "<pre>\n\nx</pre><textarea>\n\ny</textarea>",
        "<p title='a&quot;b'>&lt;&amp;&nbsp;</p>",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN"><p><table></table>"#,
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"><p>x"#,
        r#"<!DOCTYPE html SYSTEM "about:legacy-compat"><p>x"#,
    ] {
        let first = parse(input);
        let second = parse(&first.to_html());
        assert_eq!(second.dump(), first.dump(), "round trip of {input:?}");
        assert_eq!(second.quirks_mode(), first.quirks_mode(), "mode of {input:?}");
    }
}

#[test]
fn void_elements_have_no_end_tag() {
    let html = parse("<br><hr><p>x</p>").to_html();
    assert!(!html.contains("</br>"));
    assert!(!html.contains("</hr>"));
    assert!(html.contains("<p>x</p>"));
}
