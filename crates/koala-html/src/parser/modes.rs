//! The insertion modes outside of body and table content.
//!
//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)

use koala_dom::{Namespace, NodeId, QuirksMode};

use super::core::{HTMLParser, InsertionMode};
use super::helpers::is_whitespace;
use super::quirks::{is_conforming_doctype, quirks_mode_for_doctype};
use crate::error::ParseErrorKind;
use crate::tokenizer::{Token, TokenizerState};

impl HTMLParser<'_> {
    /// Record the "Parse error." that goes with ignoring or mishandling
    /// `token`, picking the error kind from the token type.
    pub(super) fn unexpected_token(&mut self, token: &Token) {
        let kind = match token {
            Token::Doctype { .. } => ParseErrorKind::UnexpectedDoctype,
            Token::StartTag { .. } => ParseErrorKind::UnexpectedStartTag,
            Token::EndTag { .. } => ParseErrorKind::UnexpectedEndTag,
            Token::Comment { .. } => ParseErrorKind::UnexpectedComment,
            Token::Character { .. } => ParseErrorKind::UnexpectedCharacter,
            Token::EndOfFile => ParseErrorKind::UnexpectedEof,
        };
        self.parse_error(kind);
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                let (name, public, system) = (
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                );

                // "If the DOCTYPE token's name is not "html", or the token's public identifier is not
                // missing, or the token's system identifier is neither missing nor "about:legacy-compat",
                // then there is a parse error."
                if !is_conforming_doctype(name, public, system) {
                    self.parse_error(ParseErrorKind::NonConformingDoctype);
                }

                // "Append a DocumentType node to the Document node, with its name set to the name
                // given in the DOCTYPE token, or the empty string if the name was missing; its public
                // ID set to the public identifier given in the DOCTYPE token, or the empty string if
                // the public identifier was missing; and its system ID set to the system identifier
                // given in the DOCTYPE token, or the empty string if the system identifier was missing."
                self.insert_doctype(
                    name.unwrap_or_default(),
                    public.unwrap_or_default(),
                    system.unwrap_or_default(),
                );

                // "Then, if the document is not an iframe srcdoc document, and the parser cannot
                // change the mode flag is false, and the DOCTYPE token matches one of the conditions
                // in the following list, then set the Document to quirks mode..."
                let mode = quirks_mode_for_doctype(name, public, system, *force_quirks);
                self.document.set_quirks_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is a parse error;
            // if the parser cannot change the mode flag is false, set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then reprocess the token."
            _ => {
                self.parse_error(ParseErrorKind::MissingDoctype);
                self.document.set_quirks_mode(QuirksMode::Quirks);
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the Document as the
            // intended parent. Append it to the Document object. Put this element in the stack
            // of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag { name, .. } if name == "html" => {
                let html = self.create_element_for_token(token, Namespace::Html);
                self.document.append_child(NodeId::ROOT, html);
                self.stack_of_open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_html_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode - Anything else](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    ///
    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of
    /// open elements. Switch the insertion mode to "before head", then
    /// reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        // STEP 1: "Create an html element whose node document is the Document object."
        let html = self.create_element_for_token(&Token::new_start_tag("html"), Namespace::Html);

        // STEP 2: "Append it to the Document object."
        self.document.append_child(NodeId::ROOT, html);

        // STEP 3: "Put this element in the stack of open elements."
        self.stack_of_open_elements.push(html);

        // STEP 4: "Switch the insertion mode to 'before head'."
        self.insertion_mode = InsertionMode::BeforeHead;

        // STEP 5: "Reprocess the token."
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode - Anything else](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    ///
    /// "Insert an HTML element for a "head" start tag token with no attributes.
    /// Set the head element pointer to the newly created head element.
    /// Switch the insertion mode to "in head". Reprocess the current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_html_element_named("head");
        self.head_element_pointer = Some(head);
        self.insertion_mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

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

                // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link""
                // "Insert an HTML element for the token. Immediately pop the current node off the
                // stack of open elements."
                // "Acknowledge the token's self-closing flag, if it is set."
                //
                // "A start tag whose tag name is "meta""
                // The encoding sniffing steps do not apply; the input is already decoded.
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    let _ = self.insert_html_element(token);
                    self.pop_current_node();
                    self.acknowledge_self_closing_flag();
                }

                // "A start tag whose tag name is "title""
                // "Follow the generic RCDATA element parsing algorithm."
                "title" => self.parse_text_only_element(token, TokenizerState::RCDATA),

                // "A start tag whose tag name is "noscript", if the scripting flag is enabled"
                // "A start tag whose tag name is one of: "noframes", "style""
                // "Follow the generic raw text element parsing algorithm."
                "noscript" if self.scripting => {
                    self.parse_text_only_element(token, TokenizerState::RAWTEXT);
                }
                "noframes" | "style" => {
                    self.parse_text_only_element(token, TokenizerState::RAWTEXT);
                }

                // "A start tag whose tag name is "noscript", if the scripting flag is disabled"
                // "Insert an HTML element for the token."
                // "Switch the insertion mode to "in head noscript"."
                "noscript" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InHeadNoscript;
                }

                // "A start tag whose tag name is "script""
                // STEP 1: "Let the adjusted insertion location be the appropriate place for
                //          inserting a node."
                // STEP 2: "Create an element for the token in the HTML namespace, with the
                //          intended parent being the element in which the adjusted insertion
                //          location finds itself."
                // STEP 7: "Insert the new element at the adjusted insertion location."
                // STEP 8: "Push the element onto the stack of open elements so that it is
                //          the new current node."
                // STEP 9: "Switch the tokenizer to the script data state."
                // STEP 10: "Let the original insertion mode be the current insertion mode."
                // STEP 11: "Switch the insertion mode to "text"."
                "script" => self.parse_text_only_element(token, TokenizerState::ScriptData),

                // "A start tag whose tag name is "template""
                "template" => {
                    // "Insert an HTML element for the token."
                    let _ = self.insert_html_element(token);
                    // "Insert a marker at the end of the list of active formatting elements."
                    self.insert_marker();
                    // "Set the frameset-ok flag to "not ok"."
                    self.frameset_ok = false;
                    // "Switch the insertion mode to "in template"."
                    self.insertion_mode = InsertionMode::InTemplate;
                    // "Push "in template" onto the stack of template insertion modes so that it
                    // is the new current template insertion mode."
                    self.template_insertion_modes
                        .push(InsertionMode::InTemplate);
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "head" => self.unexpected_token(token),

                _ => self.handle_in_head_anything_else(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "head""
                // "Pop the current node (which will be the head element) off the stack of open elements."
                // "Switch the insertion mode to "after head"."
                "head" => {
                    self.pop_current_node();
                    self.insertion_mode = InsertionMode::AfterHead;
                }

                // "An end tag whose tag name is one of: "body", "html", "br""
                // "Act as described in the "anything else" entry below."
                "body" | "html" | "br" => self.handle_in_head_anything_else(token),

                // "An end tag whose tag name is "template""
                "template" => self.close_template_element(),

                // "Any other end tag"
                // "Parse error. Ignore the token."
                _ => self.unexpected_token(token),
            },

            // "Anything else"
            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// "Anything else":
    /// "Pop the current node (which will be the head element) off the stack of open elements."
    /// "Switch the insertion mode to "after head"."
    /// "Reprocess the token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        self.pop_current_node();
        self.insertion_mode = InsertionMode::AfterHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// "An end tag whose tag name is "template""
    fn close_template_element(&mut self) {
        // "If there is no template element on the stack of open elements, then
        // this is a parse error; ignore the token."
        if !self.stack_contains("template") {
            self.parse_error(ParseErrorKind::UnexpectedEndTag);
            return;
        }

        // STEP 1: "Generate all implied end tags thoroughly."
        self.generate_all_implied_end_tags_thoroughly();

        // STEP 2: "If the current node is not a template element, then this is a
        // parse error."
        if !self.current_node_is("template") {
            self.parse_error(ParseErrorKind::MisnestedEndTag);
        }

        // STEP 3: "Pop elements from the stack of open elements until a template
        // element has been popped from the stack."
        self.pop_until("template");

        // STEP 4: "Clear the list of active formatting elements up to the last marker."
        self.clear_active_formatting_elements_to_last_marker();

        // STEP 5: "Pop the current template insertion mode off the stack of
        // template insertion modes."
        let _ = self.template_insertion_modes.pop();

        // STEP 6: "Reset the insertion mode appropriately."
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from the stack of open
            // elements; the new current node will be a head element."
            // "Switch the insertion mode to "in head"."
            Token::EndTag { name } if name == "noscript" => {
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InHead;
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound", "link", "meta",
            // "noframes", "style""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules(InsertionMode::InHead, token);
            }
            Token::Comment { .. } => self.process_using_rules(InsertionMode::InHead, token),
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "An end tag whose tag name is "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if name == "br" => {
                self.handle_in_head_noscript_anything_else(token);
            }

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" || name == "noscript" => {
                self.unexpected_token(token);
            }
            Token::EndTag { .. } => self.unexpected_token(token),

            // "Anything else"
            _ => self.handle_in_head_noscript_anything_else(token),
        }
    }

    /// "Parse error."
    /// "Pop the current node (which will be a noscript element) from the stack of
    /// open elements; the new current node will be a head element."
    /// "Switch the insertion mode to "in head"."
    /// "Reprocess the token."
    fn handle_in_head_noscript_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.pop_current_node();
        self.insertion_mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

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

                // "A start tag whose tag name is "body""
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                // "Switch the insertion mode to "in body"."
                "body" => {
                    let _ = self.insert_html_element(token);
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InBody;
                }

                // "A start tag whose tag name is "frameset""
                // "Insert an HTML element for the token."
                // "Switch the insertion mode to "in frameset"."
                "frameset" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InFrameset;
                }

                // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link",
                // "meta", "noframes", "script", "style", "template", "title""
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    // "Parse error."
                    self.unexpected_token(token);
                    // "Push the node pointed to by the head element pointer onto the stack of
                    // open elements."
                    let Some(head) = self.head_element_pointer else {
                        return;
                    };
                    self.stack_of_open_elements.push(head);
                    // "Process the token using the rules for the "in head" insertion mode."
                    self.process_using_rules(InsertionMode::InHead, token);
                    // "Remove the node pointed to by the head element pointer from the stack of
                    // open elements. (It might not be the current node at this point.)"
                    self.remove_from_stack(head);
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "head" => self.unexpected_token(token),

                _ => self.handle_after_head_anything_else(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "template" => self.process_using_rules(InsertionMode::InHead, token),

                // "An end tag whose tag name is one of: "body", "html", "br""
                // "Act as described in the "anything else" entry below."
                "body" | "html" | "br" => self.handle_after_head_anything_else(token),

                // "Any other end tag"
                // "Parse error. Ignore the token."
                _ => self.unexpected_token(token),
            },

            // "Anything else"
            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no attributes."
    /// "Switch the insertion mode to "in body"."
    /// "Reprocess the current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element_named("body");
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "An end-of-file token"
            // "Parse error."
            // "If the current node is a script element, then set its already started to true."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and reprocess the token."
            Token::EndOfFile => {
                self.parse_error(ParseErrorKind::UnexpectedEof);
                self.pop_current_node();
                self.insertion_mode = self.original_insertion_mode;
                self.reprocess_token(token);
            }

            // "An end tag whose tag name is "script""
            // Scripts are never executed, so this is the same as any other end tag.
            //
            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                self.pop_current_node();
                self.insertion_mode = self.original_insertion_mode;
            }

            // The tokenizer only produces character, end tag and end-of-file
            // tokens in the text states.
            _ => {}
        }
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "A comment token"
            // "A DOCTYPE token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Character { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link",
                // "meta", "noframes", "script", "style", "template", "title""
                // "Process the token using the rules for the "in head" insertion mode."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    self.process_using_rules(InsertionMode::InHead, token);
                }

                // "A start tag whose tag name is one of: "caption", "colgroup", "tbody", "tfoot", "thead""
                "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.switch_template_mode(InsertionMode::InTable, token);
                }

                // "A start tag whose tag name is "col""
                "col" => self.switch_template_mode(InsertionMode::InColumnGroup, token),

                // "A start tag whose tag name is "tr""
                "tr" => self.switch_template_mode(InsertionMode::InTableBody, token),

                // "A start tag whose tag name is one of: "td", "th""
                "td" | "th" => self.switch_template_mode(InsertionMode::InRow, token),

                // "Any other start tag"
                _ => self.switch_template_mode(InsertionMode::InBody, token),
            },

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::EndTag { name } if name == "template" => {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.unexpected_token(token),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If there is no template element on the stack of open elements, then
                // stop parsing. (fragment case)"
                if !self.stack_contains("template") {
                    self.stop_parsing();
                    return;
                }

                // "Otherwise, this is a parse error."
                self.parse_error(ParseErrorKind::UnexpectedEof);
                // "Pop elements from the stack of open elements until a template element
                // has been popped from the stack."
                self.pop_until("template");
                // "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // "Pop the current template insertion mode off the stack of template
                // insertion modes."
                let _ = self.template_insertion_modes.pop();
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
                // "Reprocess the token."
                self.reprocess_token(token);
            }
        }
    }

    /// "Pop the current template insertion mode off the stack of template
    /// insertion modes."
    /// "Push `mode` onto the stack of template insertion modes so that it is
    /// the new current template insertion mode."
    /// "Switch the insertion mode to `mode`, and reprocess the token."
    fn switch_template_mode(&mut self, mode: InsertionMode, token: &Token) {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.insertion_mode = mode;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the stack of open
            // elements (the html element)."
            Token::Comment { data } => {
                let html = self.stack_of_open_elements.first().copied();
                self.insert_comment(data, html.or(Some(NodeId::ROOT)));
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "html""
            // "If the parser was created as part of the HTML fragment parsing algorithm, this
            // is a parse error; ignore the token. (fragment case)"
            // "Otherwise, switch the insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                if self.is_fragment_case() {
                    self.unexpected_token(token);
                } else {
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and reprocess the token."
            _ => {
                self.unexpected_token(token);
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
            }

            // "An end tag whose tag name is "frameset""
            Token::EndTag { name } if name == "frameset" => {
                // "If the current node is the root html element, then this is a parse error;
                // ignore the token. (fragment case)"
                if self.current_node_is_root() {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open elements."
                self.pop_current_node();
                // "If the parser was not created as part of the HTML fragment parsing algorithm
                // (fragment case), and the current node is no longer a frameset element, then
                // switch the insertion mode to "after frameset"."
                if !self.is_fragment_case() && !self.current_node_is("frameset") {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
            }

            // "A start tag whose tag name is "frame""
            // "Insert an HTML element for the token. Immediately pop the current node off the
            // stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag { name, .. } if name == "frame" => {
                let _ = self.insert_html_element(token);
                self.pop_current_node();
                self.acknowledge_self_closing_flag();
            }

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } if name == "noframes" => {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            // "If the current node is not the root html element, then this is a parse error."
            // "Stop parsing."
            Token::EndOfFile => {
                if !self.current_node_is_root() {
                    self.parse_error(ParseErrorKind::UnexpectedEof);
                }
                self.stop_parsing();
            }

            // "A DOCTYPE token"
            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after frameset"."
            Token::EndTag { name } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
            }

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } if name == "noframes" => {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "A DOCTYPE token"
            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => self.process_using_rules(InsertionMode::InBody, token),
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules(InsertionMode::InBody, token);
            }
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and reprocess the token."
            _ => {
                self.unexpected_token(token);
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment(data, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
            // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => self.process_using_rules(InsertionMode::InBody, token),
            Token::Character { data } if is_whitespace(*data) => {
                self.process_using_rules(InsertionMode::InBody, token);
            }
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules(InsertionMode::InBody, token);
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } if name == "noframes" => {
                self.process_using_rules(InsertionMode::InHead, token);
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    /// "the current node is the root html element"
    pub(super) fn current_node_is_root(&self) -> bool {
        self.stack_of_open_elements.len() <= 1
    }
}
