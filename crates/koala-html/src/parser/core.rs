//! The tree construction stage.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

use strum_macros::Display;

use koala_dom::{Document, ElementData, Namespace, NodeId};

use super::foreign_content::{is_html_integration_point, is_mathml_text_integration_point};
use crate::error::{self, ParseError, ParseErrorKind};
use crate::tokenizer::{HTMLTokenizer, Token, TokenizerState};

const COMPONENT: &str = "HTML Parser";

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list of active formatting elements... is used to handle mis-nested
/// formatting element tags."
///
/// The list contains entries that are either elements or markers.
#[derive(Debug, Clone)]
pub enum ActiveFormattingElement {
    /// A formatting element entry.
    ///
    /// "The list contains elements in the formatting category..."
    /// Formatting elements are: a, b, big, code, em, font, i, nobr, s, small,
    /// strike, strong, tt, u.
    Element {
        /// The `NodeId` of the element in the document.
        node_id: NodeId,
        /// The original token, kept to recreate the element during the
        /// adoption agency algorithm or when reconstructing.
        token: Token,
    },
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Markers are pushed when entering: applet, object, marquee, template,
    /// td, th, caption. They scope the list so that formatting elements from
    /// outside these elements don't affect content inside.
    Marker,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser builds a [`Document`] from the tokens it pulls from its
/// tokenizer, one at a time, telling the tokenizer which lexical state to use
/// whenever an element needs it.
#[derive(Debug)]
pub struct HTMLParser<'a> {
    pub(super) tokenizer: HTMLTokenizer<'a>,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// "the insertion mode that the parser will return to after the text or
    /// in table text mode"
    pub(super) original_insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    /// "The stack of template insertion modes"
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena. The last entry is the current node.
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    ///
    /// Initially, the list is empty.
    pub(super) active_formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was opened
    /// and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<NodeId>,

    /// The document under construction. `NodeId::ROOT` is the Document node.
    pub(super) document: Document,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    /// The context element when parsing a fragment.
    pub(super) context_element: Option<NodeId>,
    fragment_context: Option<String>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    pub(super) scripting: bool,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    /// "The frameset-ok flag is set to "ok" when the parser is created."
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    ///
    /// "The pending table character tokens list"
    pub(super) pending_table_character_tokens: String,

    /// Set after `pre`, `listing` and `textarea` start tags: a directly
    /// following LF character token is dropped.
    pub(super) skip_next_newline: bool,

    /// [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    pub(super) self_closing_acknowledged: bool,

    /// Whether we've stopped parsing.
    stopped: bool,

    errors: Vec<ParseError>,
    diagnostics: bool,
}

impl<'a> HTMLParser<'a> {
    /// Create a parser for a complete document.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            tokenizer: HTMLTokenizer::new(input),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: InsertionMode::Initial,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            document: Document::new(),
            context_element: None,
            fragment_context: None,
            scripting: false,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_character_tokens: String::new(),
            skip_next_newline: false,
            self_closing_acknowledged: false,
            stopped: false,
            errors: Vec::new(),
            diagnostics: false,
        }
    }

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was created,
    /// and "disabled" otherwise."
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    /// Echo every parse error to stderr as it is recorded.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self.tokenizer = self.tokenizer.with_diagnostics(enabled);
        self
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse the input as the contents of a `context` element instead of as a
    /// whole document. The context is a tag name, optionally prefixed with
    /// `svg ` or `math ` for a foreign context element (`svg path`).
    #[must_use]
    pub fn with_fragment_context(mut self, context: &str) -> Self {
        self.fragment_context = Some(context.to_string());
        self
    }

    /// Run the parser to completion and return the document and every parse
    /// error, in the order they were detected.
    #[must_use]
    pub fn run(mut self) -> (Document, Vec<ParseError>) {
        self.document.set_scripting_enabled(self.scripting);
        if let Some(context) = self.fragment_context.take() {
            self.set_up_fragment(&context);
        }

        while !self.stopped {
            let Some(token) = self.next_token() else {
                break;
            };

            // "If the next token is a U+000A LINE FEED (LF) character token,
            // then ignore that token and move on to the next one."
            if std::mem::take(&mut self.skip_next_newline)
                && matches!(token, Token::Character { data: '\n' })
            {
                continue;
            }

            self.self_closing_acknowledged = false;
            self.process_token(&token);

            // [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
            // "When a start tag token is emitted with its self-closing flag set, if the
            // flag is not acknowledged when the token is processed by the tree
            // construction stage, that is a parse error."
            if let Token::StartTag {
                self_closing: true, ..
            } = token
                && !self.self_closing_acknowledged
            {
                self.parse_error(ParseErrorKind::NonVoidHtmlElementStartTagWithTrailingSolidus);
            }
        }

        // Anything still open when the input ran out is simply closed.
        self.stack_of_open_elements.clear();
        self.errors.extend(self.tokenizer.take_errors());
        (self.document, self.errors)
    }

    /// Pull the next token, after telling the tokenizer whether CDATA
    /// sections are allowed, and drain the tokenizer's errors so they come
    /// before any error the tree builder records for this token.
    fn next_token(&mut self) -> Option<Token> {
        let cdata_allowed = self
            .adjusted_current_node()
            .and_then(|id| self.document.as_element(id))
            .is_some_and(|element| element.namespace != Namespace::Html);
        self.tokenizer.set_cdata_allowed(cdata_allowed);
        let token = self.tokenizer.next_token();
        self.errors.extend(self.tokenizer.take_errors());
        token
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher."
    pub(super) fn process_token(&mut self, token: &Token) {
        if self.should_use_insertion_mode_rules(token) {
            self.process_using_rules(self.insertion_mode, token);
        } else {
            self.process_foreign_content(token);
        }
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// "Reprocess the token" - process the same token again, through the
    /// dispatcher, after a mode switch.
    pub(super) fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    /// The dispatcher's list of cases in which the token is handled by the
    /// current insertion mode rather than by the rules for foreign content.
    fn should_use_insertion_mode_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        let Some(element) = self.document.as_element(node) else {
            return true;
        };

        // "If the adjusted current node is an element in the HTML namespace"
        if element.namespace == Namespace::Html {
            return true;
        }

        let start_tag_name = match token {
            Token::StartTag { name, .. } => Some(name.as_str()),
            _ => None,
        };
        let is_character = matches!(token, Token::Character { .. });

        // "If the adjusted current node is a MathML text integration point and the
        // token is a start tag whose tag name is neither "mglyph" nor "malignmark""
        // "If the adjusted current node is a MathML text integration point and the
        // token is a character token"
        if is_mathml_text_integration_point(element)
            && (is_character || start_tag_name.is_some_and(|n| n != "mglyph" && n != "malignmark"))
        {
            return true;
        }

        // "If the adjusted current node is a MathML annotation-xml element and the
        // token is a start tag whose tag name is "svg""
        if element.namespace == Namespace::MathMl
            && element.tag_name == "annotation-xml"
            && start_tag_name == Some("svg")
        {
            return true;
        }

        // "If the adjusted current node is an HTML integration point and the token
        // is a start tag"
        // "If the adjusted current node is an HTML integration point and the token
        // is a character token"
        if is_html_integration_point(element) && (is_character || start_tag_name.is_some()) {
            return true;
        }

        // "If the token is an end-of-file token"
        token.is_eof()
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#using-the-rules-for)
    ///
    /// "When the algorithm below says that the user agent is to do something
    /// "using the rules for the m insertion mode", where m is one of these
    /// modes, the user agent must use the rules described under the m insertion
    /// mode's section, but must leave the insertion mode unchanged."
    pub(super) fn process_using_rules(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),

            // ===== TABLE PARSING MODES =====
            // [§ 13.2.6.4.9-15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),

            // ===== FORM ELEMENT MODES =====
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),

            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),

            // ===== FRAMESET MODES =====
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(super) fn stop_parsing(&mut self) {
        self.stack_of_open_elements.clear();
        self.stopped = true;
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record a tree construction error at the tokenizer's current position.
    pub(super) fn parse_error(&mut self, kind: ParseErrorKind) {
        let error = ParseError::new(kind, self.tokenizer.position());
        error::record(&mut self.errors, COMPONENT, self.diagnostics, error);
    }

    /// Returns true when this parser was created by the fragment parsing
    /// algorithm.
    pub(super) const fn is_fragment_case(&self) -> bool {
        self.context_element.is_some()
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    fn set_up_fragment(&mut self, context: &str) {
        // The context element lives in the arena but is never attached to the
        // document.
        let (namespace, local_name) = match context.split_once(' ') {
            Some(("svg", name)) => (Namespace::Svg, name),
            Some(("math", name)) => (Namespace::MathMl, name),
            _ => (Namespace::Html, context),
        };
        let local_name = local_name.trim();
        let context_element = self
            .document
            .create_element(ElementData::new(local_name, namespace));
        self.context_element = Some(context_element);

        // STEP 4: "Set the state of the HTML parser's tokenization stage as follows,
        // switching on the context element:"
        if namespace == Namespace::Html {
            let state = match local_name {
                "title" | "textarea" => TokenizerState::RCDATA,
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => TokenizerState::RAWTEXT,
                "script" => TokenizerState::ScriptData,
                "noscript" if self.scripting => TokenizerState::RAWTEXT,
                "plaintext" => TokenizerState::PLAINTEXT,
                _ => TokenizerState::Data,
            };
            self.tokenizer.switch_to(state);
        }

        // STEP 5: "Let root be the result of creating an html element..."
        // STEP 6: "Append the element root to the Document node created above."
        // STEP 7: "Set up the HTML parser's stack of open elements so that it
        // contains just the single element root."
        let root = self
            .document
            .create_element(ElementData::new("html", Namespace::Html));
        self.document.append_child(NodeId::ROOT, root);
        self.stack_of_open_elements.push(root);

        // STEP 8: "If the context element is a template element, then push
        // "in template" onto the stack of template insertion modes so that it
        // is the new current template insertion mode."
        if namespace == Namespace::Html && local_name == "template" {
            self.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        // STEP 10: "Reset the parser's insertion mode appropriately."
        self.reset_insertion_mode_appropriately();

        // STEP 11: "Set the HTML parser's form element pointer to the nearest node to
        // the context element that is a form element (going straight up the ancestor
        // chain, and including the element itself, if it is a form element), if any."
        if namespace == Namespace::Html && local_name == "form" {
            self.form_element_pointer = Some(context_element);
        }
    }
}
