//! Integration tests for the HTML tokenizer.

use koala_html::{HTMLTokenizer, ParseErrorKind, Token, TokenizerState};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    koala_html::tokenize(input).0
}

/// Helper to tokenize a string and return only the error kinds
fn error_kinds(input: &str) -> Vec<ParseErrorKind> {
    koala_html::tokenize(input)
        .1
        .into_iter()
        .map(|e| e.kind)
        .collect()
}

/// Helper to tokenize starting in a given state, the way the tree builder
/// switches the tokenizer after `<style>`, `<title>` and friends.
fn tokenize_in(state: TokenizerState, last_start_tag: &str, input: &str) -> Vec<Token> {
    // The appropriate end tag check needs the name of the last start tag, so
    // feed it through the data state first.
    let source = format!("<{last_start_tag}>{input}");
    let mut tokenizer = HTMLTokenizer::new(&source);
    let _start_tag = tokenizer.next_token();
    tokenizer.switch_to(state);
    std::iter::from_fn(|| tokenizer.next_token()).collect()
}

/// Collapse adjacent character tokens into strings, leaving other tokens in
/// their canonical `Display` form.
fn describe(tokens: &[Token]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut text = String::new();
    for token in tokens {
        if let Token::Character { data } = token {
            text.push(*data);
            continue;
        }
        if !text.is_empty() {
            out.push(format!("\"{}\"", std::mem::take(&mut text)));
        }
        out.push(token.to_string());
    }
    out
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[4], Token::Character { data: 'o' }));
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_empty_input_is_just_eof() {
    let (tokens, errors) = koala_html::tokenize("");
    assert_eq!(tokens, vec![Token::EndOfFile]);
    assert!(errors.is_empty());
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    assert_eq!(
        tokens[0].to_string(),
        r#"Doctype(html, "-//W3C//DTD HTML 4.01//EN", "http://www.w3.org/TR/html4/strict.dtd", false)"#
    );
}

#[test]
fn test_doctype_missing_name_forces_quirks() {
    let (tokens, errors) = koala_html::tokenize("<!DOCTYPE>");
    assert_eq!(tokens[0].to_string(), "Doctype(None, None, None, true)");
    assert_eq!(errors[0].kind, ParseErrorKind::MissingDoctypeName);
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert!(attributes.is_empty());
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DiV ID=x></DIV>");
    assert_eq!(
        describe(&tokens),
        vec![r#"StartTag(div, [id="x"], false)"#, "EndTag(div)", "EOF"]
    );
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::EndTag { name } => assert_eq!(name, "div"),
        _ => panic!("Expected EndTag token"),
    }
}

#[test]
fn test_end_tag_attributes_are_dropped() {
    let (tokens, errors) = koala_html::tokenize("</p class=x/>");
    assert_eq!(tokens[0], Token::new_end_tag("p"));
    let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ParseErrorKind::EndTagWithAttributes));
    assert!(kinds.contains(&ParseErrorKind::EndTagWithTrailingSolidus));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(describe(&tokens), vec!["Comment( hello )", "EOF"]);
}

#[test]
fn test_abrupt_empty_comment() {
    let (tokens, errors) = koala_html::tokenize("<!-->");
    assert_eq!(describe(&tokens), vec!["Comment()", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::AbruptClosingOfEmptyComment);
}

#[test]
fn test_nested_comment_is_reported() {
    let tokens = tokenize("<!-- a <!-- b -->");
    assert_eq!(describe(&tokens), vec!["Comment( a <!-- b )", "EOF"]);
    assert!(error_kinds("<!-- a <!-- b -->").contains(&ParseErrorKind::NestedComment));
}

#[test]
fn test_processing_instruction_becomes_bogus_comment() {
    let (tokens, errors) = koala_html::tokenize("<?xml version=\"1.0\"?>");
    assert_eq!(describe(&tokens), vec!["Comment(?xml version=\"1.0\"?)", "EOF"]);
    assert_eq!(
        errors[0].kind,
        ParseErrorKind::UnexpectedQuestionMarkInsteadOfTagName
    );
}

#[test]
fn test_cdata_in_html_content_is_a_comment() {
    let (tokens, errors) = koala_html::tokenize("<![CDATA[x]]>");
    assert_eq!(describe(&tokens), vec!["Comment([CDATA[x]])", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::CdataInHtmlContent);
}

#[test]
fn test_cdata_allowed_in_foreign_content() {
    let mut tokenizer = HTMLTokenizer::new("<![CDATA[a<b]]>");
    tokenizer.set_cdata_allowed(true);
    let tokens: Vec<Token> = std::iter::from_fn(|| tokenizer.next_token()).collect();
    assert_eq!(describe(&tokens), vec!["\"a<b\"", "EOF"]);
    assert!(tokenizer.errors().is_empty());
}

#[test]
fn test_attribute_double_quoted() {
    let tokens = tokenize(r#"<div class="container">"#);
    assert_eq!(tokens[0].attribute("class"), Some("container"));
}

#[test]
fn test_attribute_single_quoted() {
    let tokens = tokenize("<div class='container'>");
    assert_eq!(tokens[0].attribute("class"), Some("container"));
}

#[test]
fn test_attribute_unquoted() {
    let tokens = tokenize("<div class=container>");
    assert_eq!(tokens[0].attribute("class"), Some("container"));
}

#[test]
fn test_boolean_attribute() {
    let tokens = tokenize("<input disabled>");
    assert_eq!(tokens[0].attribute("disabled"), Some(""));
}

#[test]
fn test_multiple_attributes() {
    let tokens = tokenize(r#"<a href="x" target=_blank title='t'>"#);
    assert_eq!(
        tokens[0].to_string(),
        r#"StartTag(a, [href="x", target="_blank", title="t"], false)"#
    );
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, errors) = koala_html::tokenize(r#"<p a="1" a="2" b="3">"#);
    assert_eq!(
        tokens[0].to_string(),
        r#"StartTag(p, [a="1", b="3"], false)"#
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ParseErrorKind::DuplicateAttribute);
}

#[test]
fn test_eof_in_tag_drops_the_tag() {
    let (tokens, errors) = koala_html::tokenize("text<div class=");
    assert_eq!(describe(&tokens), vec!["\"text\"", "EOF"]);
    assert_eq!(errors.last().map(|e| e.kind), Some(ParseErrorKind::EofInTag));
}

#[test]
fn test_missing_end_tag_name() {
    let (tokens, errors) = koala_html::tokenize("a</>b");
    assert_eq!(describe(&tokens), vec!["\"ab\"", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::MissingEndTagName);
}

#[test]
fn test_lone_less_than_is_text() {
    assert_eq!(describe(&tokenize("1 < 2")), vec!["\"1 < 2\"", "EOF"]);
}

#[test]
fn test_tag_with_text_content() {
    let tokens = tokenize("<p>Hi</p>");
    assert_eq!(
        describe(&tokens),
        vec!["StartTag(p, [], false)", "\"Hi\"", "EndTag(p)", "EOF"]
    );
}

// ========== Preprocessing ==========

#[test]
fn test_newlines_are_normalized() {
    let tokens = tokenize("a\r\nb\rc\n");
    assert_eq!(describe(&tokens), vec!["\"a\nb\nc\n\"", "EOF"]);
}

#[test]
fn test_control_characters_are_reported() {
    let kinds = error_kinds("a\u{1}b");
    assert_eq!(kinds, vec![ParseErrorKind::ControlCharacterInInputStream]);
    assert!(error_kinds("a\u{FDD0}").contains(&ParseErrorKind::NoncharacterInInputStream));
}

#[test]
fn test_error_offsets_count_code_points() {
    let (_, errors) = koala_html::tokenize("éé\u{1}");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].offset, 2);
}

// ========== Lexical states set by the tree builder ==========

#[test]
fn test_style_element_rawtext() {
    let tokens = tokenize_in(TokenizerState::RAWTEXT, "style", "p > a { }</style>");
    assert_eq!(
        describe(&tokens),
        vec!["\"p > a { }\"", "EndTag(style)", "EOF"]
    );
}

#[test]
fn test_style_with_fake_tags() {
    let tokens = tokenize_in(TokenizerState::RAWTEXT, "style", "<div>&amp;</div></style>");
    assert_eq!(
        describe(&tokens),
        vec!["\"<div>&amp;</div>\"", "EndTag(style)", "EOF"]
    );
}

#[test]
fn test_style_with_wrong_end_tag() {
    let tokens = tokenize_in(TokenizerState::RAWTEXT, "style", "a</styles>b</style>");
    assert_eq!(
        describe(&tokens),
        vec!["\"a</styles>b\"", "EndTag(style)", "EOF"]
    );
}

#[test]
fn test_title_element_rcdata() {
    let tokens = tokenize_in(TokenizerState::RCDATA, "title", "a &lt; <b></title>");
    assert_eq!(
        describe(&tokens),
        vec!["\"a < <b>\"", "EndTag(title)", "EOF"]
    );
}

#[test]
fn test_textarea_element_rcdata() {
    let tokens = tokenize_in(TokenizerState::RCDATA, "textarea", "<p>x</p></textarea>");
    assert_eq!(
        describe(&tokens),
        vec!["\"<p>x</p>\"", "EndTag(textarea)", "EOF"]
    );
}

#[test]
fn test_script_data_escaped_comment() {
    let tokens = tokenize_in(
        TokenizerState::ScriptData,
        "script",
        "<!--<script></script>--></script>",
    );
    assert_eq!(
        describe(&tokens),
        vec!["\"<!--<script></script>-->\"", "EndTag(script)", "EOF"]
    );
}

#[test]
fn test_plaintext_never_ends() {
    let tokens = tokenize_in(TokenizerState::PLAINTEXT, "plaintext", "</plaintext><b>");
    assert_eq!(describe(&tokens), vec!["\"</plaintext><b>\"", "EOF"]);
}

// ========== Character references ==========

#[test]
fn test_character_reference_bare_ampersand() {
    let (tokens, errors) = koala_html::tokenize("a & b");
    assert_eq!(describe(&tokens), vec!["\"a & b\"", "EOF"]);
    assert!(errors.is_empty());
}

#[test]
fn test_named_character_reference_amp() {
    assert_eq!(
        tokenize("&amp;"),
        vec![Token::new_character('&'), Token::EndOfFile]
    );
}

#[test]
fn test_named_character_reference_lt_gt() {
    assert_eq!(describe(&tokenize("&lt;&gt;")), vec!["\"<>\"", "EOF"]);
}

#[test]
fn test_named_character_reference_without_semicolon() {
    let (tokens, errors) = koala_html::tokenize("&amp x");
    assert_eq!(describe(&tokens), vec!["\"& x\"", "EOF"]);
    assert_eq!(
        errors[0].kind,
        ParseErrorKind::MissingSemicolonAfterCharacterReference
    );
}

#[test]
fn test_named_character_reference_longest_prefix() {
    assert_eq!(describe(&tokenize("&notin;")), vec!["\"\u{2209}\"", "EOF"]);
    // A legacy name glued to more letters is left alone.
    let (tokens, errors) = koala_html::tokenize("&notit;");
    assert_eq!(describe(&tokens), vec!["\"&notit;\"", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::UnknownNamedCharacterReference);
}

#[test]
fn test_named_character_reference_unknown() {
    let (tokens, errors) = koala_html::tokenize("&bogus;");
    assert_eq!(describe(&tokens), vec!["\"&bogus;\"", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::UnknownNamedCharacterReference);
}

#[test]
fn test_named_character_reference_in_attribute() {
    let tokens = tokenize(r#"<a href="?a=1&amp;b=2&copy=3&lt">"#);
    // Legacy references followed by "=" or an alphanumeric stay literal in
    // attribute values.
    assert_eq!(tokens[0].attribute("href"), Some("?a=1&b=2&copy=3<"));
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(describe(&tokenize("&#65;&#x42;&#X43;")), vec!["\"ABC\"", "EOF"]);
}

#[test]
fn test_numeric_character_reference_windows_1252_remap() {
    let (tokens, errors) = koala_html::tokenize("&#x80;&#150;");
    assert_eq!(describe(&tokens), vec!["\"\u{20AC}\u{2013}\"", "EOF"]);
    assert_eq!(errors[0].kind, ParseErrorKind::ControlCharacterReference);
}

#[test]
fn test_numeric_character_reference_replacements() {
    let (tokens, errors) = koala_html::tokenize("&#0;&#xD800;&#x110000;");
    assert_eq!(
        describe(&tokens),
        vec!["\"\u{FFFD}\u{FFFD}\u{FFFD}\"", "EOF"]
    );
    let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParseErrorKind::NullCharacterReference,
            ParseErrorKind::SurrogateCharacterReference,
            ParseErrorKind::CharacterReferenceOutsideUnicodeRange,
        ]
    );
}

#[test]
fn test_numeric_character_reference_without_digits() {
    let (tokens, errors) = koala_html::tokenize("&#;");
    assert_eq!(describe(&tokens), vec!["\"&#;\"", "EOF"]);
    assert_eq!(
        errors[0].kind,
        ParseErrorKind::AbsenceOfDigitsInNumericCharacterReference
    );
}

#[test]
fn test_null_in_data_is_passed_through() {
    let (tokens, errors) = koala_html::tokenize("\0");
    assert_eq!(tokens[0], Token::new_character('\0'));
    assert_eq!(errors[0].kind, ParseErrorKind::UnexpectedNullCharacter);
}

#[test]
fn test_token_display_forms() {
    let (tokens, _) = koala_html::tokenize("x<!DOCTYPE>");
    let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    assert_eq!(
        shown,
        vec!["Character('x')", "Doctype(None, None, None, true)", "EOF"]
    );
}
