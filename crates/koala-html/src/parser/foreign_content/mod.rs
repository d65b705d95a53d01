//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
//!
//! Attributes that the foreign attribute table would turn into namespaced
//! attributes (`xlink:href`, `xml:lang`, `xmlns:xlink`) already arrive from the
//! tokenizer under their prefixed name, which is how the DOM stores them.

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use koala_dom::{ElementData, Namespace};

use super::core::HTMLParser;
use super::helpers::is_whitespace;
use crate::error::ParseErrorKind;
use crate::tokenizer::Token;

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2",
/// "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
/// "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong",
/// "strike", "sub", "sup", "table", "tt", "u", "ul", "var""
const BREAKOUT_START_TAGS: &[&str] = &[
    "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div", "dl", "dt", "em",
    "embed", "h1", "h2", "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
    "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong", "strike", "sub",
    "sup", "table", "tt", "u", "ul", "var",
];

/// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
///
/// "A node is a MathML text integration point if it is one of the following
/// elements: A MathML mi element, A MathML mo element, A MathML mn element,
/// A MathML ms element, A MathML mtext element"
pub(super) fn is_mathml_text_integration_point(element: &ElementData) -> bool {
    element.namespace == Namespace::MathMl
        && matches!(element.tag_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// "A node is an HTML integration point if it is one of the following elements:
/// A MathML annotation-xml element whose start tag token had an attribute with
/// the name "encoding" whose value was an ASCII case-insensitive match for the
/// string "text/html"; A MathML annotation-xml element whose start tag token had
/// an attribute with the name "encoding" whose value was an ASCII
/// case-insensitive match for the string "application/xhtml+xml"; An SVG
/// foreignObject element; An SVG desc element; An SVG title element"
pub(super) fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::MathMl => {
            element.tag_name == "annotation-xml"
                && element.attrs.get("encoding").is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
        }
        Namespace::Svg => matches!(element.tag_name.as_str(), "foreignObject" | "desc" | "title"),
        Namespace::Html => false,
    }
}

/// Apply the tag name and attribute adjustments a start tag gets before it
/// becomes an element in `namespace`.
pub(super) fn adjust_foreign_token(token: &Token, namespace: Namespace) -> Token {
    let mut adjusted = token.clone();
    if let Token::StartTag {
        name, attributes, ..
    } = &mut adjusted
    {
        match namespace {
            // "Adjust MathML attributes for the token."
            Namespace::MathMl => adjust_mathml_attributes(attributes),
            // "Adjust SVG attributes for the token."
            Namespace::Svg => {
                adjust_svg_tag_name(name);
                adjust_svg_attributes(attributes);
            }
            Namespace::Html => {}
        }
    }
    adjusted
}

impl HTMLParser<'_> {
    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(super) fn process_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
                self.insert_character('\u{FFFD}');
            }
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A
            // LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR),
            // or U+0020 SPACE"
            // "Insert the token's character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),
            // "Any other character token"
            // "Insert the token's character. Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.insert_character(*data);
                self.frameset_ok = false;
            }
            // "A comment token"
            Token::Comment { data } => self.insert_comment(data, None),
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorKind::UnexpectedDoctype),
            Token::StartTag { name, .. }
                if BREAKOUT_START_TAGS.contains(&name.as_str())
                    || (name == "font"
                        && ["color", "face", "size"]
                            .iter()
                            .any(|attr| token.attribute(attr).is_some())) =>
            {
                self.break_out_of_foreign_content(token);
            }
            // "An end tag whose tag name is "br", "p""
            Token::EndTag { name } if name == "br" || name == "p" => {
                self.break_out_of_foreign_content(token);
            }
            Token::StartTag { self_closing, .. } => {
                self.insert_foreign_start_tag(token, *self_closing);
            }
            // "An end tag whose tag name is "script", if the current node is an SVG
            // script element"
            // "Pop the current node off the stack of open elements."
            Token::EndTag { name }
                if name == "script"
                    && self
                        .current_node()
                        .and_then(|id| self.element(id))
                        .is_some_and(|e| e.namespace == Namespace::Svg && e.tag_name == "script") =>
            {
                self.pop_current_node();
            }
            Token::EndTag { name } => self.foreign_end_tag(name, token),
            // The dispatcher sends end-of-file tokens to the insertion mode.
            Token::EndOfFile => self.process_using_rules(self.insertion_mode, token),
        }
    }

    /// The breakout start tags, `font` with `color`, `face` or `size`, and the
    /// `br` and `p` end tags:
    ///
    /// "Parse error."
    /// "While the current node is not a MathML text integration point, an HTML
    /// integration point, or an element in the HTML namespace, pop elements from
    /// the stack of open elements."
    /// "Reprocess the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &Token) {
        let kind = if matches!(token, Token::EndTag { .. }) {
            ParseErrorKind::UnexpectedEndTag
        } else {
            ParseErrorKind::UnexpectedStartTag
        };
        self.parse_error(kind);

        while let Some(current) = self.current_node() {
            let Some(element) = self.element(current) else {
                break;
            };
            if element.namespace == Namespace::Html
                || is_mathml_text_integration_point(element)
                || is_html_integration_point(element)
            {
                break;
            }
            self.pop_current_node();
        }

        self.process_using_rules(self.insertion_mode, token);
    }

    /// "Any other start tag"
    fn insert_foreign_start_tag(&mut self, token: &Token, self_closing: bool) {
        let namespace = self
            .adjusted_current_node()
            .and_then(|id| self.element(id))
            .map_or(Namespace::Html, |e| e.namespace);

        // "If the adjusted current node is an element in the MathML namespace,
        // adjust MathML attributes for the token."
        // "If the adjusted current node is an element in the SVG namespace, and
        // the token's tag name is one of the ones in the first column of the
        // following table, change the tag name to the name given in the
        // corresponding cell in the second column."
        // "If the adjusted current node is an element in the SVG namespace,
        // adjust SVG attributes for the token."
        // "Adjust foreign attributes for the token."
        let adjusted = adjust_foreign_token(token, namespace);

        // "Insert a foreign element for the token, with adjusted current node's
        // namespace and false."
        let _ = self.insert_foreign_element(&adjusted, namespace);

        // "If the token has its self-closing flag set, then run the appropriate
        // steps from the following list:"
        // "If the token's tag name is "script", and the new current node is in
        // the SVG namespace: Acknowledge the token's self-closing flag, and then
        // act as described in the steps for a "script" end tag below."
        // "Otherwise: Pop the current node off the stack of open elements and
        // acknowledge the token's self-closing flag."
        if self_closing {
            self.pop_current_node();
            self.acknowledge_self_closing_flag();
        }
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, name: &str, token: &Token) {
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return;
        };

        // STEP 1: "Initialize node to be the current node (the bottommost node of
        // the stack)."
        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        // same as the tag name of the token, then this is a parse error."
        let lowercase_name = |parser: &Self, index: usize| {
            parser
                .element(parser.stack_of_open_elements[index])
                .map(|e| e.tag_name.to_ascii_lowercase())
        };
        if lowercase_name(self, index).as_deref() != Some(name) {
            self.parse_error(ParseErrorKind::UnexpectedEndTag);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of open
            // elements, then return. (fragment case)"
            if index == 0 {
                return;
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the same
            // as the tag name of the token, pop elements from the stack of open
            // elements until node has been popped from the stack, and then return."
            if lowercase_name(self, index).as_deref() == Some(name) {
                self.stack_of_open_elements.truncate(index);
                return;
            }

            // STEP 5: "Set node to the previous entry in the stack of open elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return to
            // the step labeled loop."
            let node = self.stack_of_open_elements[index];
            if self
                .element(node)
                .is_some_and(|e| e.namespace == Namespace::Html)
            {
                // STEP 7: "Otherwise, process the token according to the rules given
                // in the section corresponding to the current insertion mode in HTML
                // content."
                self.process_using_rules(self.insertion_mode, token);
                return;
            }
        }
    }
}
