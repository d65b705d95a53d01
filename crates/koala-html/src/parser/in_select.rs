//! The select insertion modes.
//!
//! [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
//! [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)

use super::core::{HTMLParser, InsertionMode};
use super::helpers::Scope;
use crate::error::ParseErrorKind;
use crate::tokenizer::Token;

/// Table tags that close a `select` opened inside a table.
const TABLE_TAGS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl HTMLParser<'_> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::Character { data: '\0' } => {
                self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
            }

            // "Any other character token"
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body" insertion mode."
                "html" => self.process_using_rules(InsertionMode::InBody, token),

                // "A start tag whose tag name is "option""
                "option" => {
                    // "If the current node is an option element, pop that node from the stack
                    // of open elements."
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    }
                    // "Insert an HTML element for the token."
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "optgroup""
                "optgroup" => {
                    // "If the current node is an option element, pop that node from the stack
                    // of open elements."
                    // "If the current node is an optgroup element, pop that node from the stack
                    // of open elements."
                    self.pop_open_option_and_optgroup();
                    // "Insert an HTML element for the token."
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "hr""
                "hr" => {
                    self.pop_open_option_and_optgroup();
                    // "Insert an HTML element for the token. Immediately pop the current node
                    // off the stack of open elements."
                    let _ = self.insert_html_element(token);
                    self.pop_current_node();
                    // "Acknowledge the token's self-closing flag, if it is set."
                    self.acknowledge_self_closing_flag();
                }

                // "A start tag whose tag name is "select""
                "select" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If the stack of open elements does not have a select element in select
                    // scope, ignore the token. (fragment case)"
                    // "Otherwise: Pop elements from the stack of open elements until a select
                    // element has been popped from the stack. Reset the insertion mode
                    // appropriately."
                    let _ = self.close_select();
                }

                // "A start tag whose tag name is one of: "input", "keygen", "textarea""
                "input" | "keygen" | "textarea" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "If the stack of open elements does not have a select element in select
                    // scope, ignore the token. (fragment case)"
                    // "Otherwise: Pop elements from the stack of open elements until a select
                    // element has been popped from the stack. Reset the insertion mode
                    // appropriately. Reprocess the token."
                    if self.close_select() {
                        self.reprocess_token(token);
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "script" | "template" => self.process_using_rules(InsertionMode::InHead, token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.unexpected_token(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "optgroup""
                "optgroup" => {
                    // STEP 1: "If the current node is an option element, and the node
                    // immediately before it in the stack of open elements is an optgroup
                    // element, then pop the current node from the stack of open elements."
                    let len = self.stack_of_open_elements.len();
                    if self.current_node_is("option")
                        && len >= 2
                        && self.is_html_element(self.stack_of_open_elements[len - 2], "optgroup")
                    {
                        self.pop_current_node();
                    }
                    // STEP 2: "If the current node is an optgroup element, then pop that node
                    // from the stack of open elements. Otherwise, this is a parse error;
                    // ignore the token."
                    if self.current_node_is("optgroup") {
                        self.pop_current_node();
                    } else {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that node from the stack
                // of open elements. Otherwise, this is a parse error; ignore the token."
                "option" => {
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    } else {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "select""
                // "If the stack of open elements does not have a select element in select
                // scope, this is a parse error; ignore the token. (fragment case)"
                "select" => {
                    if !self.close_select() {
                        self.unexpected_token(token);
                    }
                }

                // "An end tag whose tag name is "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "template" => self.process_using_rules(InsertionMode::InHead, token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.unexpected_token(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "caption", "table", "tbody", "tfoot",
            // "thead", "tr", "td", "th""
            Token::StartTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                // "Parse error."
                self.parse_error(ParseErrorKind::MisplacedStartTag);
                // "Pop elements from the stack of open elements until a select element has
                // been popped from the stack."
                self.pop_until("select");
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
                // "Reprocess the token."
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is one of: "caption", "table", "tbody", "tfoot",
            // "thead", "tr", "td", "th""
            Token::EndTag { name } if TABLE_TAGS.contains(&name.as_str()) => {
                // "Parse error."
                self.unexpected_token(token);
                // "If the stack of open elements does not have an element in table scope that
                // is an HTML element with the same tag name as that of the token, then ignore
                // the token."
                if !self.has_element_in_scope(name, Scope::Table) {
                    return;
                }
                // "Otherwise: Pop elements from the stack of open elements until a select
                // element has been popped from the stack."
                self.pop_until("select");
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
                // "Reprocess the token."
                self.reprocess_token(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion mode."
            _ => self.process_using_rules(InsertionMode::InSelect, token),
        }
    }

    fn pop_open_option_and_optgroup(&mut self) {
        if self.current_node_is("option") {
            self.pop_current_node();
        }
        if self.current_node_is("optgroup") {
            self.pop_current_node();
        }
    }

    /// Pop through the open `select` and reset the insertion mode. Returns
    /// false, leaving the stack untouched, if there is no `select` in select
    /// scope.
    fn close_select(&mut self) -> bool {
        if !self.has_element_in_scope("select", Scope::Select) {
            return false;
        }
        self.pop_until("select");
        self.reset_insertion_mode_appropriately();
        true
    }
}
