//! The table insertion modes.
//!
//! [§ 13.2.6.4.9 - 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
//!
//! Content that may not appear inside a table is moved in front of it by
//! running the "in body" rules with foster parenting enabled.

use super::core::{HTMLParser, InsertionMode};
use super::helpers::{Scope, is_whitespace};
use crate::error::ParseErrorKind;
use crate::tokenizer::Token;

/// "clear the stack back to a table context"
const TABLE_CONTEXT: &[&str] = &["table", "template", "html"];

/// "clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[&str] = &["tbody", "tfoot", "thead", "template", "html"];

/// "clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[&str] = &["tr", "template", "html"];

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl HTMLParser<'_> {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody, template, tfoot,
            // thead, or tr element"
            Token::Character { .. }
                if self.current_node_is_one_of(&[
                    "table", "tbody", "template", "tfoot", "thead", "tr",
                ]) =>
            {
                // "Let the pending table character tokens be an empty list of tokens."
                self.pending_table_character_tokens.clear();
                // "Let the original insertion mode be the current insertion mode."
                self.original_insertion_mode = self.insertion_mode;
                // "Switch the insertion mode to "in table text" and reprocess the token."
                self.insertion_mode = InsertionMode::InTableText;
                self.reprocess_token(token);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "caption""
                "caption" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    // "Insert a marker at the end of the list of active formatting elements."
                    self.insert_marker();
                    // "Insert an HTML element for the token, then switch the insertion mode to
                    // "in caption"."
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InCaption;
                }

                // "A start tag whose tag name is "colgroup""
                "colgroup" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    // "Insert an HTML element for the token, then switch the insertion mode to
                    // "in column group"."
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InColumnGroup;
                }

                // "A start tag whose tag name is "col""
                "col" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    // "Insert an HTML element for a "colgroup" start tag token with no
                    // attributes, then switch the insertion mode to "in column group"."
                    let _ = self.insert_html_element_named("colgroup");
                    self.insertion_mode = InsertionMode::InColumnGroup;
                    // "Reprocess the current token."
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
                "tbody" | "tfoot" | "thead" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    // "Insert an HTML element for the token, then switch the insertion mode to
                    // "in table body"."
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InTableBody;
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                "td" | "th" | "tr" => {
                    // "Clear the stack back to a table context."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    // "Insert an HTML element for a "tbody" start tag token with no
                    // attributes, then switch the insertion mode to "in table body"."
                    let _ = self.insert_html_element_named("tbody");
                    self.insertion_mode = InsertionMode::InTableBody;
                    // "Reprocess the current token."
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is "table""
                "table" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If the stack of open elements does not have a table element in table
                    // scope, ignore the token."
                    if !self.has_element_in_scope("table", Scope::Table) {
                        return;
                    }
                    // "Otherwise: Pop elements from this stack until a table element has been
                    // popped from the stack."
                    self.pop_until("table");
                    // "Reset the insertion mode appropriately."
                    self.reset_insertion_mode_appropriately();
                    // "Reprocess the token."
                    self.reprocess_token(token);
                }

                // "A start tag whose tag name is one of: "style", "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "style" | "script" | "template" => {
                    self.process_using_rules(InsertionMode::InHead, token);
                }

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name "type", or if it
                // does, but that attribute's value is not an ASCII case-insensitive match for
                // the string "hidden", then: act as described in the "anything else" entry
                // below."
                "input"
                    if token
                        .attribute("type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("hidden")) =>
                {
                    // "Otherwise: Parse error."
                    self.parse_error(ParseErrorKind::MisplacedStartTag);
                    // "Insert an HTML element for the token."
                    let _ = self.insert_html_element(token);
                    // "Pop that input element off the stack of open elements."
                    self.pop_current_node();
                    // "Acknowledge the token's self-closing flag, if it is set."
                    self.acknowledge_self_closing_flag();
                }

                // "A start tag whose tag name is "form""
                "form" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If there is a template element on the stack of open elements, or if the
                    // form element pointer is not null, ignore the token."
                    if self.stack_contains("template") || self.form_element_pointer.is_some() {
                        return;
                    }
                    // "Otherwise: Insert an HTML element for the token, and set the form
                    // element pointer to point to the element created."
                    let form = self.insert_html_element(token);
                    self.form_element_pointer = Some(form);
                    // "Pop that form element off the stack of open elements."
                    self.pop_current_node();
                }

                _ => self.foster_parent_token(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "table""
                "table" => {
                    // "If the stack of open elements does not have a table element in table
                    // scope, this is a parse error; ignore the token."
                    if !self.has_element_in_scope("table", Scope::Table) {
                        self.unexpected_token(token);
                        return;
                    }
                    // "Otherwise: Pop elements from this stack until a table element has been
                    // popped from the stack."
                    self.pop_until("table");
                    // "Reset the insertion mode appropriately."
                    self.reset_insertion_mode_appropriately();
                }

                // "An end tag whose tag name is one of: "body", "caption", "col", "colgroup",
                // "html", "tbody", "td", "tfoot", "th", "thead", "tr""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.unexpected_token(token),

                // "An end tag whose tag name is "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "template" => self.process_using_rules(InsertionMode::InHead, token),

                _ => self.foster_parent_token(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules(InsertionMode::InBody, token),

            Token::Character { .. } => self.foster_parent_token(token),
        }
    }

    /// "Anything else"
    ///
    /// "Parse error. Enable foster parenting, process the token using the
    /// rules for the "in body" insertion mode, and then disable foster
    /// parenting."
    fn foster_parent_token(&mut self, token: &Token) {
        match token {
            Token::StartTag { .. } => self.parse_error(ParseErrorKind::MisplacedStartTag),
            Token::Character { .. } => self.parse_error(ParseErrorKind::MisplacedCharacter),
            _ => self.unexpected_token(token),
        }
        self.foster_parenting = true;
        self.process_using_rules(InsertionMode::InBody, token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "...while the current node is not a table, template, or html element,
    /// pop elements from the stack of open elements."
    fn clear_stack_back_to(&mut self, context: &[&str]) {
        while self.current_node().is_some() && !self.current_node_is_one_of(context) {
            self.pop_current_node();
        }
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
            }

            // "Any other character token"
            // "Append the character token to the pending table character tokens list."
            Token::Character { data } => self.pending_table_character_tokens.push(*data),

            // "Anything else"
            _ => {
                let pending = std::mem::take(&mut self.pending_table_character_tokens);

                // "If any of the tokens in the pending table character tokens list are
                // character tokens that are not ASCII whitespace, then this is a parse error:
                // reprocess the character tokens in the pending table character tokens list
                // using the rules given in the "anything else" entry in the "in table"
                // insertion mode."
                if pending.chars().any(|c| !is_whitespace(c)) {
                    // One error for the whole run.
                    self.parse_error(ParseErrorKind::MisplacedCharacter);
                    self.foster_parenting = true;
                    for c in pending.chars() {
                        self.process_using_rules(InsertionMode::InBody, &Token::new_character(c));
                    }
                    self.foster_parenting = false;
                } else {
                    // "Otherwise, insert the characters given by the pending table character
                    // tokens list."
                    for c in pending.chars() {
                        self.insert_character(c);
                    }
                }

                // "Switch the insertion mode to the original insertion mode and reprocess the
                // token."
                self.insertion_mode = self.original_insertion_mode;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is "caption""
            Token::EndTag { name } if name == "caption" => {
                let _ = self.close_caption(token);
            }

            // "A start tag whose tag name is one of: "caption", "col", "colgroup", "tbody",
            // "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if self.close_caption(token) {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag { name } if name == "table" => {
                if self.close_caption(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup", "html",
            // "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.process_using_rules(InsertionMode::InBody, token),
        }
    }

    /// The steps shared by the `caption` end tag and the tokens that
    /// implicitly close a caption. Returns false if the token was ignored.
    fn close_caption(&mut self, token: &Token) -> bool {
        // "If the stack of open elements does not have a caption element in table scope,
        // this is a parse error; ignore the token. (fragment case)"
        if !self.has_element_in_scope("caption", Scope::Table) {
            self.unexpected_token(token);
            return false;
        }

        // STEP 1: "Generate implied end tags."
        // STEP 2: "Now, if the current node is not a caption element, then this is a parse
        // error."
        // STEP 3: "Pop elements from this stack until a caption element has been popped
        // from the stack."
        self.close_element("caption");

        // STEP 4: "Clear the list of active formatting elements up to the last marker."
        self.clear_active_formatting_elements_to_last_marker();

        // STEP 5: "Switch the insertion mode to "in table"."
        self.insertion_mode = InsertionMode::InTable;
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE
            // FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "A comment token"
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the current node off the
            // stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag { name, .. } if name == "col" => {
                let _ = self.insert_html_element(token);
                self.pop_current_node();
                self.acknowledge_self_closing_flag();
            }

            // "An end tag whose tag name is "colgroup""
            Token::EndTag { name } if name == "colgroup" => {
                // "If the current node is not a colgroup element, then this is a parse error;
                // ignore the token."
                if !self.current_node_is("colgroup") {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open elements. Switch the
                // insertion mode to "in table"."
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InTable;
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag { name } if name == "col" => self.unexpected_token(token),

            // "A start tag whose tag name is "template""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } | Token::EndTag { name } if name == "template" => {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules(InsertionMode::InBody, token),

            // "Anything else"
            _ => {
                // "If the current node is not a colgroup element, then this is a parse error;
                // ignore the token."
                if !self.current_node_is("colgroup") {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open elements."
                self.pop_current_node();
                // "Switch the insertion mode to "in table"."
                self.insertion_mode = InsertionMode::InTable;
                // "Reprocess the token."
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is "tr""
            Token::StartTag { name, .. } if name == "tr" => {
                // "Clear the stack back to a table body context."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                // "Insert an HTML element for the token, then switch the insertion mode to
                // "in row"."
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "th", "td""
            Token::StartTag { name, .. } if name == "th" || name == "td" => {
                // "Parse error."
                self.parse_error(ParseErrorKind::MisplacedStartTag);
                // "Clear the stack back to a table body context."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                // "Insert an HTML element for a "tr" start tag token with no attributes, then
                // switch the insertion mode to "in row"."
                let _ = self.insert_html_element_named("tr");
                self.insertion_mode = InsertionMode::InRow;
                // "Reprocess the current token."
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in table scope that
                // is an HTML element with the same tag name as the token, this is a parse
                // error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise: Clear the stack back to a table body context."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                // "Pop the current node from the stack of open elements. Switch the insertion
                // mode to "in table"."
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InTable;
            }

            // "A start tag whose tag name is one of: "caption", "col", "colgroup", "tbody",
            // "tfoot", "thead""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.close_table_section(token);
            }
            Token::EndTag { name } if name == "table" => self.close_table_section(token),

            // "An end tag whose tag name is one of: "body", "caption", "col", "colgroup",
            // "html", "td", "th", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.process_using_rules(InsertionMode::InTable, token),
        }
    }

    /// Close the open `tbody`, `thead` or `tfoot` and reprocess `token` in
    /// the "in table" insertion mode.
    fn close_table_section(&mut self, token: &Token) {
        // "If the stack of open elements does not have a tbody, thead, or tfoot element in
        // table scope, this is a parse error; ignore the token."
        if !self.has_any_element_in_scope(TABLE_SECTIONS, Scope::Table) {
            self.unexpected_token(token);
            return;
        }
        // "Otherwise: Clear the stack back to a table body context."
        self.clear_stack_back_to(TABLE_BODY_CONTEXT);
        // "Pop the current node from the stack of open elements. Switch the insertion mode
        // to "in table"."
        self.pop_current_node();
        self.insertion_mode = InsertionMode::InTable;
        // "Reprocess the token."
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "th", "td""
            Token::StartTag { name, .. } if name == "th" || name == "td" => {
                // "Clear the stack back to a table row context."
                self.clear_stack_back_to(TABLE_ROW_CONTEXT);
                // "Insert an HTML element for the token, then switch the insertion mode to
                // "in cell"."
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InCell;
                // "Insert a marker at the end of the list of active formatting elements."
                self.insert_marker();
            }

            // "An end tag whose tag name is "tr""
            Token::EndTag { name } if name == "tr" => {
                let _ = self.close_row(token);
            }

            // "A start tag whose tag name is one of: "caption", "col", "colgroup", "tbody",
            // "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if self.close_row(token) {
                    self.reprocess_token(token);
                }
            }
            Token::EndTag { name } if name == "table" => {
                if self.close_row(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in table scope that
                // is an HTML element with the same tag name as the token, this is a parse
                // error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                // "If the stack of open elements does not have a tr element in table scope,
                // ignore the token."
                // "Otherwise: Clear the stack back to a table row context. Pop the current
                // node (which will be a tr element) from the stack of open elements. Switch
                // the insertion mode to "in table body". Reprocess the token."
                if self.has_element_in_scope("tr", Scope::Table) && self.close_row(token) {
                    self.reprocess_token(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col", "colgroup",
            // "html", "td", "th""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.unexpected_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.process_using_rules(InsertionMode::InTable, token),
        }
    }

    /// The steps of the `tr` end tag, shared by the tokens that implicitly
    /// close a row. Returns false if the token was ignored.
    fn close_row(&mut self, token: &Token) -> bool {
        // "If the stack of open elements does not have a tr element in table scope, this is
        // a parse error; ignore the token."
        if !self.has_element_in_scope("tr", Scope::Table) {
            self.unexpected_token(token);
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context."
        self.clear_stack_back_to(TABLE_ROW_CONTEXT);
        // "Pop the current node (which will be a tr element) from the stack of open elements.
        // Switch the insertion mode to "in table body"."
        self.pop_current_node();
        self.insertion_mode = InsertionMode::InTableBody;
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name } if name == "td" || name == "th" => {
                // "If the stack of open elements does not have an element in table scope that
                // is an HTML element with the same tag name as that of the token, then this is
                // a parse error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                // STEP 1: "Generate implied end tags."
                // STEP 2: "Now, if the current node is not an HTML element with the same tag
                // name as the token, then this is a parse error."
                // STEP 3: "Pop elements from the stack of open elements until an HTML element
                // with the same tag name as the token has been popped from the stack."
                self.close_element(name);
                // STEP 4: "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // STEP 5: "Switch the insertion mode to "in row"."
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "caption", "col", "colgroup", "tbody",
            // "td", "tfoot", "th", "thead", "tr""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                // "Assert: The stack of open elements has a td or th element in table scope."
                // Outside of that, the fragment case, ignore the token.
                if !self.has_any_element_in_scope(&["td", "th"], Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                // "Close the cell (see below) and reprocess the token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col", "colgroup",
            // "html""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.unexpected_token(token);
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot", "thead", "tr""
            Token::EndTag { name }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                // "If the stack of open elements does not have an element in table scope that
                // is an HTML element with the same tag name as that of the token, then this is
                // a parse error; ignore the token."
                if !self.has_element_in_scope(name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, close the cell (see below) and reprocess the token."
                self.close_the_cell();
                self.reprocess_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.process_using_rules(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    fn close_the_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.generate_implied_end_tags(None);
        // STEP 2: "If the current node is not now a td element or a th element, then this is
        // a parse error."
        if !self.current_node_is_one_of(&["td", "th"]) {
            self.parse_error(ParseErrorKind::MisnestedEndTag);
        }
        // STEP 3: "Pop elements from the stack of open elements until a td element or a th
        // element has been popped from the stack."
        self.pop_until_one_of(&["td", "th"]);
        // STEP 4: "Clear the list of active formatting elements up to the last marker."
        self.clear_active_formatting_elements_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in row"."
        self.insertion_mode = InsertionMode::InRow;
    }
}
