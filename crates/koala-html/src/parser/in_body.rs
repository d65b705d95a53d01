//! The "in body" insertion mode.
//!
//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use koala_dom::{Namespace, NodeId, QuirksMode};

use super::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
use super::foreign_content::adjust_foreign_token;
use super::helpers::{Scope, is_special_element, is_whitespace};
use crate::error::ParseErrorKind;
use crate::tokenizer::{Token, TokenizerState};

/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main",
/// "menu", "nav", "ol", "p", "search", "section", "summary", "ul""
const BLOCK_START_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
];

/// "An end tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "button", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
/// "listing", "main", "menu", "nav", "ol", "pre", "search", "section",
/// "summary", "ul""
const BLOCK_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "summary",
    "ul",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small, strike,
/// strong, tt, and u."
const FORMATTING_TAGS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// Elements that may still be open at the end of the body without a parse
/// error: "a dd element, a dt element, an li element, an optgroup element, an
/// option element, a p element, an rb element, an rp element, an rt element,
/// an rtc element, a tbody element, a td element, a tfoot element, a th
/// element, a thead element, a tr element, the body element, or the html
/// element"
const IMPLICITLY_CLOSABLE: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot",
    "th", "thead", "tr", "body", "html",
];

impl HTMLParser<'_> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            Token::Character { data } if is_whitespace(*data) => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
                self.frameset_ok = false;
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { name, .. } => self.in_body_start_tag(name, token),
            Token::EndTag { name } => self.in_body_end_tag(name, token),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If the stack of template insertion modes is not empty, then process the
                // token using the rules for the "in template" insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    self.process_using_rules(InsertionMode::InTemplate, token);
                    return;
                }

                // "Otherwise, follow these steps:"
                // STEP 1: "If there is a node in the stack of open elements that is not either a
                // dd element, ... or the html element, then this is a parse error."
                if self.has_unclosed_elements() {
                    self.parse_error(ParseErrorKind::UnexpectedEof);
                }
                // STEP 2: "Stop parsing."
                self.stop_parsing();
            }
        }
    }

    /// Returns true if an element other than those that may be closed
    /// implicitly is still open.
    fn has_unclosed_elements(&self) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&id| !self.is_html_element_one_of(id, IMPLICITLY_CLOSABLE))
    }

    fn in_body_start_tag(&mut self, name: &str, token: &Token) {
        match name {
            // "A start tag whose tag name is "html""
            "html" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If there is a template element on the stack of open elements, then
                // ignore the token."
                if self.stack_contains("template") {
                    return;
                }
                // "Otherwise, for each attribute on the token, check to see if the attribute
                // is already present on the top element of the stack of open elements. If it
                // is not, add the attribute and its corresponding value to that element."
                if let Some(&html) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html, token);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link",
            // "meta", "noframes", "script", "style", "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
            | "template" | "title" => self.process_using_rules(InsertionMode::InHead, token),

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the stack of open elements has only one node on it, or if the second
                // element on the stack of open elements is not a body element, or if there is
                // a template element on the stack of open elements, then ignore the token.
                // (fragment case or there is a template element on the stack)"
                let Some(body) = self.second_element_if_body() else {
                    return;
                };
                if self.stack_contains("template") {
                    return;
                }
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for each attribute on
                // the token, check to see if the attribute is already present on the body
                // element (the second element) on the stack of open elements, and if it is not,
                // add the attribute and its corresponding value to that element."
                self.frameset_ok = false;
                self.merge_attributes(body, token);
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the stack of open elements has only one node on it, or if the second
                // element on the stack of open elements is not a body element, then ignore the
                // token. (fragment case or there is a template element on the stack)"
                let Some(body) = self.second_element_if_body() else {
                    return;
                };
                // "If the frameset-ok flag is set to "not ok", ignore the token."
                if !self.frameset_ok {
                    return;
                }
                // "Otherwise, run the following steps:"
                // STEP 1: "Remove the second element on the stack of open elements from its
                // parent node, if it has one."
                self.document.detach(body);
                // STEP 2: "Pop all the nodes from the bottom of the stack of open elements,
                // from the current node up to, but not including, the root html element."
                self.stack_of_open_elements.truncate(1);
                // STEP 3: "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // STEP 4: "Switch the insertion mode to "in frameset"."
                self.insertion_mode = InsertionMode::InFrameset;
            }

            // "A start tag whose tag name is one of: "address", "article", "aside", ..."
            // "If the stack of open elements has a p element in button scope, then close a p
            // element."
            // "Insert an HTML element for the token."
            _ if BLOCK_START_TAGS.contains(&name) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            _ if HEADING_TAGS.contains(&name) => {
                // "If the stack of open elements has a p element in button scope, then close
                // a p element."
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is one of "h1", "h2",
                // "h3", "h4", "h5", or "h6", then this is a parse error; pop the current node
                // off the stack of open elements."
                if self.current_node_is_one_of(HEADING_TAGS) {
                    self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    self.pop_current_node();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                // "If the stack of open elements has a p element in button scope, then close
                // a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "If the next token is a U+000A LINE FEED (LF) character token, then ignore
                // that token and move on to the next one. (Newlines at the start of pre blocks
                // are ignored as an authoring convenience.)"
                self.skip_next_newline = true;
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                // "If the form element pointer is not null, and there is no template element
                // on the stack of open elements, then this is a parse error; ignore the token."
                let has_template = self.stack_contains("template");
                if self.form_element_pointer.is_some() && !has_template {
                    self.parse_error(ParseErrorKind::NestedForm);
                    return;
                }
                // "Otherwise: If the stack of open elements has a p element in button scope,
                // then close a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token, and, if there is no template element
                // on the stack of open elements, set the form element pointer to point to the
                // element created."
                let form = self.insert_html_element(token);
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            "li" => self.start_list_item(token, &["li"]),

            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.start_list_item(token, &["dd", "dt"]),

            // "A start tag whose tag name is "plaintext""
            "plaintext" => {
                // "If the stack of open elements has a p element in button scope, then close
                // a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Switch the tokenizer to the PLAINTEXT state."
                self.tokenizer.switch_to(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "If the stack of open elements has a button element in scope, then run these
                // substeps:"
                if self.has_element_in_scope("button", Scope::Default) {
                    // "Parse error."
                    self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    // "Generate implied end tags."
                    self.generate_implied_end_tags(None);
                    // "Pop elements from the stack of open elements until a button element has
                    // been popped from the stack."
                    self.pop_until("button");
                }
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a element between the
                // end of the list and the last marker on the list (or the start of the list if
                // there is no marker on the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element from the list of
                // active formatting elements and the stack of open elements if the adoption
                // agency algorithm didn't already remove it (it might not have if the element is
                // not in table scope)."
                if let Some(existing) = self.active_formatting_element_after_marker("a") {
                    self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    self.run_adoption_agency("a");
                    self.remove_from_active_formatting_elements(existing);
                    self.remove_from_stack(existing);
                }
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token. Push onto the list of active formatting
                // elements that element."
                self.insert_formatting_element(token);
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope, then this is a
                // parse error; run the adoption agency algorithm for the token, then once again
                // reconstruct the active formatting elements, if any."
                if self.has_element_in_scope("nobr", Scope::Default) {
                    self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    self.run_adoption_agency("nobr");
                }
                // "Insert an HTML element for the token. Push onto the list of active formatting
                // elements that element."
                self.insert_formatting_element(token);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em", "font", "i",
            // "s", "small", "strike", "strong", "tt", "u""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Push onto the list of active formatting
            // elements that element."
            _ if FORMATTING_TAGS.contains(&name) => self.insert_formatting_element(token),

            // "A start tag whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Insert a marker at the end of the list of active formatting elements."
                self.insert_marker();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            "table" => {
                // "If the Document is not set to quirks mode, and the stack of open elements
                // has a p element in button scope, then close a p element."
                if self.document.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Switch the insertion mode to "in table"."
                self.insertion_mode = InsertionMode::InTable;
            }

            // "A start tag whose tag name is one of: "area", "br", "embed", "img", "keygen",
            // "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => self.insert_void_element(token),

            // "A start tag whose tag name is "input""
            "input" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token. Immediately pop the current node off
                // the stack of open elements."
                let _ = self.insert_html_element(token);
                self.pop_current_node();
                // "Acknowledge the token's self-closing flag, if it is set."
                self.acknowledge_self_closing_flag();
                // "If the token does not have an attribute with the name "type", or if it does,
                // but that attribute's value is not an ASCII case-insensitive match for the
                // string "hidden", then: set the frameset-ok flag to "not ok"."
                if !token
                    .attribute("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
                {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source", "track""
            // "Insert an HTML element for the token. Immediately pop the current node off the
            // stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            "param" | "source" | "track" => {
                let _ = self.insert_html_element(token);
                self.pop_current_node();
                self.acknowledge_self_closing_flag();
            }

            // "A start tag whose tag name is "hr""
            "hr" => {
                // "If the stack of open elements has a p element in button scope, then close
                // a p element."
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token. Immediately pop the current node off
                // the stack of open elements."
                let _ = self.insert_html_element(token);
                self.pop_current_node();
                // "Acknowledge the token's self-closing flag, if it is set."
                self.acknowledge_self_closing_flag();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess it. (Don't ask.)"
            "image" => {
                self.parse_error(ParseErrorKind::UnexpectedStartTag);
                if let Token::StartTag {
                    self_closing,
                    attributes,
                    ..
                } = token
                {
                    let img = Token::StartTag {
                        name: "img".to_string(),
                        self_closing: *self_closing,
                        attributes: attributes.clone(),
                    };
                    self.reprocess_token(&img);
                }
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // STEP 1: "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // STEP 2: "If the next token is a U+000A LINE FEED (LF) character token, then
                // ignore that token and move on to the next one."
                self.skip_next_newline = true;
                // STEP 3: "Switch the tokenizer to the RCDATA state."
                self.tokenizer.switch_to(TokenizerState::RCDATA);
                // STEP 4: "Let the original insertion mode be the current insertion mode."
                self.original_insertion_mode = self.insertion_mode;
                // STEP 5: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // STEP 6: "Switch the insertion mode to "text"."
                self.insertion_mode = InsertionMode::Text;
            }

            // "A start tag whose tag name is "xmp""
            "xmp" => {
                // "If the stack of open elements has a p element in button scope, then close
                // a p element."
                self.close_p_element_in_button_scope();
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Follow the generic raw text element parsing algorithm."
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "iframe""
            // "Set the frameset-ok flag to "not ok"."
            // "Follow the generic raw text element parsing algorithm."
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "noembed" => self.parse_text_only_element(token, TokenizerState::RAWTEXT),
            "noscript" if self.scripting => {
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "select""
            "select" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption", "in table body",
                // "in row", or "in cell", then switch the insertion mode to "in select in
                // table". Otherwise, switch the insertion mode to "in select"."
                self.insertion_mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            "optgroup" | "option" => {
                // "If the current node is an option element, then pop the current node off the
                // stack of open elements."
                if self.current_node_is("option") {
                    self.pop_current_node();
                }
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            "rb" | "rtc" => {
                // "If the stack of open elements has a ruby element in scope, then generate
                // implied end tags. If the current node is not now a ruby element, this is a
                // parse error."
                if self.has_element_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    }
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                // "If the stack of open elements has a ruby element in scope, then generate
                // implied end tags, except for rtc elements. If the current node is not now a
                // rtc element or a ruby element, this is a parse error."
                if self.has_element_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is_one_of(&["rtc", "ruby"]) {
                        self.parse_error(ParseErrorKind::UnexpectedStartTag);
                    }
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "math""
            "math" => self.insert_foreign_root(token, Namespace::MathMl),

            // "A start tag whose tag name is "svg""
            "svg" => self.insert_foreign_root(token, Namespace::Svg),

            // "A start tag whose tag name is one of: "caption", "col", "colgroup", "frame",
            // "head", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => self.unexpected_token(token),

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }
        }
    }

    fn in_body_end_tag(&mut self, name: &str, token: &Token) {
        match name {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            "template" => self.process_using_rules(InsertionMode::InHead, token),

            // "An end tag whose tag name is "body""
            "body" => {
                // "If the stack of open elements does not have a body element in scope, this is
                // a parse error; ignore the token."
                if !self.has_element_in_scope("body", Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, if there is a node in the stack of open elements that is not
                // either a dd element, ... or the html element, then this is a parse error."
                if self.has_unclosed_elements() {
                    self.parse_error(ParseErrorKind::EndTagWithUnclosedElements);
                }
                // "Switch the insertion mode to "after body"."
                self.insertion_mode = InsertionMode::AfterBody;
            }

            // "An end tag whose tag name is "html""
            "html" => {
                // "If the stack of open elements does not have a body element in scope, this is
                // a parse error; ignore the token."
                if !self.has_element_in_scope("body", Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                if self.has_unclosed_elements() {
                    self.parse_error(ParseErrorKind::EndTagWithUnclosedElements);
                }
                // "Switch the insertion mode to "after body"."
                // "Reprocess the token."
                self.insertion_mode = InsertionMode::AfterBody;
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "address", "article", "aside", ..."
            _ if BLOCK_END_TAGS.contains(&name) => {
                // "If the stack of open elements does not have an element in scope that is an
                // HTML element with the same tag name as that of the token, then this is a
                // parse error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, run these steps:"
                // STEP 1: "Generate implied end tags."
                // STEP 2: "If the current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error."
                // STEP 3: "Pop elements from the stack of open elements until an HTML element
                // with the same tag name as the token has been popped from the stack."
                self.close_element(name);
            }

            // "An end tag whose tag name is "form""
            "form" => self.close_form_element(token),

            // "An end tag whose tag name is "p""
            "p" => {
                // "If the stack of open elements does not have a p element in button scope,
                // then this is a parse error; insert an HTML element for a "p" start tag token
                // with no attributes."
                if !self.has_element_in_scope("p", Scope::Button) {
                    self.unexpected_token(token);
                    let _ = self.insert_html_element_named("p");
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            "li" => {
                // "If the stack of open elements does not have an li element in list item scope,
                // then this is a parse error; ignore the token."
                if !self.has_element_in_scope("li", Scope::ListItem) {
                    self.unexpected_token(token);
                    return;
                }
                // STEP 1: "Generate implied end tags, except for li elements."
                self.generate_implied_end_tags(Some("li"));
                // STEP 2: "If the current node is not an li element, then this is a parse error."
                if !self.current_node_is("li") {
                    self.parse_error(ParseErrorKind::MisnestedEndTag);
                }
                // STEP 3: "Pop elements from the stack of open elements until an li element has
                // been popped from the stack."
                self.pop_until("li");
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                // "If the stack of open elements does not have an element in scope that is an
                // HTML element with the same tag name as that of the token, then this is a
                // parse error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                // STEP 1: "Generate implied end tags, except for HTML elements with the same tag
                // name as the token."
                self.generate_implied_end_tags(Some(name));
                // STEP 2: "If the current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error."
                if !self.current_node_is(name) {
                    self.parse_error(ParseErrorKind::MisnestedEndTag);
                }
                // STEP 3: "Pop elements from the stack of open elements until an HTML element
                // with the same tag name as the token has been popped from the stack."
                self.pop_until(name);
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            _ if HEADING_TAGS.contains(&name) => {
                // "If the stack of open elements does not have an element in scope that is an
                // HTML element and whose tag name is one of "h1", "h2", "h3", "h4", "h5", or
                // "h6", then this is a parse error; ignore the token."
                if !self.has_any_element_in_scope(HEADING_TAGS, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                // STEP 1: "Generate implied end tags."
                self.generate_implied_end_tags(None);
                // STEP 2: "If the current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error."
                if !self.current_node_is(name) {
                    self.parse_error(ParseErrorKind::MisnestedEndTag);
                }
                // STEP 3: "Pop elements from the stack of open elements until an HTML element
                // whose tag name is one of "h1", "h2", "h3", "h4", "h5", or "h6" has been popped
                // from the stack."
                self.pop_until_one_of(HEADING_TAGS);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code", "em", "font", "i",
            // "nobr", "s", "small", "strike", "strong", "tt", "u""
            // "Run the adoption agency algorithm for the token."
            _ if FORMATTING_TAGS.contains(&name) => self.run_adoption_agency(name),

            // "An end tag token whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                // "If the stack of open elements does not have an element in scope that is an
                // HTML element with the same tag name as that of the token, then this is a
                // parse error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                // STEP 1: "Generate implied end tags."
                // STEP 2: "If the current node is not an HTML element with the same tag name as
                // that of the token, then this is a parse error."
                // STEP 3: "Pop elements from the stack of open elements until an HTML element
                // with the same tag name as the token has been popped from the stack."
                self.close_element(name);
                // STEP 4: "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as described in the
            // next entry; i.e. act as if this was a "br" start tag token with no attributes,
            // rather than the end tag token that it actually is."
            "br" => {
                self.unexpected_token(token);
                self.insert_void_element(&Token::new_start_tag("br"));
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(name),
        }
    }

    /// The second element on the stack of open elements, if there is one and
    /// it is a body element.
    fn second_element_if_body(&self) -> Option<NodeId> {
        self.stack_of_open_elements
            .get(1)
            .copied()
            .filter(|&id| self.is_html_element(id, "body"))
    }

    /// "An end tag whose tag name is "form""
    fn close_form_element(&mut self, token: &Token) {
        // "If there is no template element on the stack of open elements, then run these
        // substeps:"
        if !self.stack_contains("template") {
            // STEP 1: "Let node be the element that the form element pointer is set to, or null
            // if it is not set to an element."
            // STEP 2: "Set the form element pointer to null."
            let node = self.form_element_pointer.take();

            // STEP 3: "If node is null or if the stack of open elements does not have node in
            // scope, then this is a parse error; return and ignore the token."
            let Some(node) = node.filter(|&node| self.has_node_in_scope(node, Scope::Default))
            else {
                self.unexpected_token(token);
                return;
            };

            // STEP 4: "Generate implied end tags."
            self.generate_implied_end_tags(None);

            // STEP 5: "If the current node is not node, then this is a parse error."
            if self.current_node() != Some(node) {
                self.parse_error(ParseErrorKind::MisnestedEndTag);
            }

            // STEP 6: "Remove node from the stack of open elements."
            self.remove_from_stack(node);
            return;
        }

        // "If there is a template element on the stack of open elements, then run these
        // substeps instead:"
        // STEP 1: "If the stack of open elements does not have a form element in scope, then
        // this is a parse error; return and ignore the token."
        if !self.has_element_in_scope("form", Scope::Default) {
            self.unexpected_token(token);
            return;
        }

        // STEP 2: "Generate implied end tags."
        // STEP 3: "If the current node is not a form element, then this is a parse error."
        // STEP 4: "Pop elements from the stack of open elements until a form element has been
        // popped from the stack."
        self.close_element("form");
    }

    /// "A start tag whose tag name is "li"" and
    /// "A start tag whose tag name is one of: "dd", "dt""
    fn start_list_item(&mut self, token: &Token, closes: &[&str]) {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2: "Initialize node to be the current node (the bottommost node of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let Some(element) = self.element(node) else {
                continue;
            };

            // STEP 3: "Loop: If node is an li element, then run these substeps:"
            if element.namespace == Namespace::Html
                && let Some(&closing) = closes.iter().find(|&&c| c == element.tag_name)
            {
                // STEP 3.1: "Generate implied end tags, except for li elements."
                self.generate_implied_end_tags(Some(closing));
                // STEP 3.2: "If the current node is not an li element, then this is a parse
                // error."
                if !self.current_node_is(closing) {
                    self.parse_error(ParseErrorKind::MisnestedEndTag);
                }
                // STEP 3.3: "Pop elements from the stack of open elements until an li element
                // has been popped from the stack."
                self.pop_until(closing);
                // STEP 3.4: "Jump to the step labeled done below."
                break;
            }

            // STEP 4: "If node is in the special category, but is not an address, div, or p
            // element, then jump to the step labeled done below."
            if is_special_element(element)
                && !(element.namespace == Namespace::Html
                    && matches!(element.tag_name.as_str(), "address" | "div" | "p"))
            {
                break;
            }

            // STEP 5: "Otherwise, set node to the previous entry in the stack of open elements
            // and return to the step labeled loop."
        }

        // STEP 6: "Done: If the stack of open elements has a p element in button scope, then
        // close a p element."
        self.close_p_element_in_button_scope();

        // STEP 7: "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(token);
    }

    /// The element named `name` in the list of active formatting elements
    /// after the last marker, if any.
    fn active_formatting_element_after_marker(&self, name: &str) -> Option<NodeId> {
        self.active_formatting_elements
            .iter()
            .rev()
            .take_while(|entry| !matches!(entry, ActiveFormattingElement::Marker))
            .find_map(|entry| match entry {
                ActiveFormattingElement::Element { node_id, .. }
                    if self.is_html_element(*node_id, name) =>
                {
                    Some(*node_id)
                }
                _ => None,
            })
    }

    /// "Reconstruct the active formatting elements, if any."
    /// "Insert an HTML element for the token. Push onto the list of active
    /// formatting elements that element."
    fn insert_formatting_element(&mut self, token: &Token) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(token);
        self.push_active_formatting_element(element, token);
    }

    /// "A start tag whose tag name is one of: "area", "br", "embed", "img",
    /// "keygen", "wbr""
    fn insert_void_element(&mut self, token: &Token) {
        // "Reconstruct the active formatting elements, if any."
        self.reconstruct_active_formatting_elements();
        // "Insert an HTML element for the token. Immediately pop the current node off the
        // stack of open elements."
        let _ = self.insert_html_element(token);
        self.pop_current_node();
        // "Acknowledge the token's self-closing flag, if it is set."
        self.acknowledge_self_closing_flag();
        // "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;
    }

    /// "A start tag whose tag name is "math"" / "A start tag whose tag name is "svg""
    fn insert_foreign_root(&mut self, token: &Token, namespace: Namespace) {
        // "Reconstruct the active formatting elements, if any."
        self.reconstruct_active_formatting_elements();
        // "Adjust MathML attributes for the token." / "Adjust SVG attributes for the token."
        // "Adjust foreign attributes for the token."
        let adjusted = adjust_foreign_token(token, namespace);
        // "Insert a foreign element for the token, with MathML namespace / SVG namespace
        // and false."
        let _ = self.insert_foreign_element(&adjusted, namespace);
        // "If the token has its self-closing flag set, pop the current node off the stack of
        // open elements and acknowledge the token's self-closing flag."
        if matches!(
            token,
            Token::StartTag {
                self_closing: true,
                ..
            }
        ) {
            self.pop_current_node();
            self.acknowledge_self_closing_flag();
        }
    }
}
