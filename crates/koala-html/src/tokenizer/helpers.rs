//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - End tag helpers for the RCDATA, RAWTEXT and script data states
//! - Attribute helpers for duplicate detection

use koala_common::warning::warn_once;

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::{Tag, TagKind, Token};
use crate::error::{self, ParseError, ParseErrorKind};

const COMPONENT: &str = "HTML Tokenizer";

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next step. The tree builder also uses this to put the tokenizer into the
    /// RCDATA, RAWTEXT, script data or PLAINTEXT state after certain start tags.
    pub const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    ///
    /// Returns None if we've reached the end of input. Invalid code points in
    /// the input stream are reported here, as they are consumed.
    pub(super) fn consume(&mut self) -> Option<char> {
        let before = self.errors.len();
        let c = self.input.next_char(&mut self.errors);
        if self.diagnostics {
            for error in &self.errors[before..] {
                warn_once(COMPONENT, &error.to_string());
            }
        }
        c
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it. Used for lookahead operations like "the next few characters are".
    pub(super) fn peek_codepoint(&mut self, offset: usize) -> Option<char> {
        self.input.peek(offset)
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "If the next few characters are..."
    ///
    /// Check if the next few characters match the target string exactly.
    pub(super) fn next_few_characters_are(&mut self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek_codepoint(i) == Some(expected))
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&mut self, target: &str) -> bool {
        target.chars().enumerate().all(|(i, expected)| {
            self.peek_codepoint(i)
                .is_some_and(|c| c.eq_ignore_ascii_case(&expected))
        })
    }

    /// Consume as many characters as `target` has.
    /// Caller must have already verified the characters are present.
    pub(super) fn consume_string(&mut self, target: &str) {
        for _ in target.chars() {
            let _ = self.consume();
        }
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    ///
    /// NOTE: HTML tokenizer uses a subset excluding CR (which is normalized earlier).
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// "Emit the current tag token."
    ///
    /// End tags lose any attributes or self-closing flag here, with the parse
    /// errors that go with them. Start tags are remembered for the
    /// appropriate end tag check.
    pub(super) fn emit_current_tag(&mut self) {
        let tag = std::mem::replace(&mut self.current_tag, Tag::new(TagKind::Start));
        match tag.kind {
            TagKind::Start => self.last_start_tag_name = Some(tag.name.clone()),
            TagKind::End => {
                // "When an end tag token is emitted with attributes, that is an
                // end-tag-with-attributes parse error."
                if !tag.attributes.is_empty() {
                    self.parse_error(ParseErrorKind::EndTagWithAttributes);
                }
                // "When an end tag token is emitted with its self-closing flag set, that is
                // an end-tag-with-trailing-solidus parse error."
                if tag.self_closing {
                    self.parse_error(ParseErrorKind::EndTagWithTrailingSolidus);
                }
            }
        }
        self.pending.push_back(tag.into_token());
    }

    /// "Emit the current comment token" / "Emit the current DOCTYPE token"
    pub(super) fn emit_current_token(&mut self) {
        if let Some(token) = self.current_token.take() {
            self.pending.push_back(token);
        }
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.pending.push_back(Token::new_character(c));
    }

    /// Emit one character token per character of `s`.
    pub(super) fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_character_token(c);
        }
    }

    /// "This is an unexpected-null-character parse error. Emit a U+FFFD
    /// REPLACEMENT CHARACTER character token."
    pub(super) fn emit_replacement_character(&mut self) {
        self.parse_error(ParseErrorKind::UnexpectedNullCharacter);
        self.emit_character_token('\u{FFFD}');
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.pending.push_back(Token::EndOfFile);
        self.at_eof = true;
    }

    /// Append to the data of the comment token under construction.
    pub(super) fn append_to_comment(&mut self, s: &str) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_str_to_comment(s);
        }
    }

    /// "Append the current input character to the comment token's data."
    pub(super) fn append_char_to_comment(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_comment(c);
        }
    }

    /// Apply a change to the DOCTYPE token under construction.
    pub(super) fn with_doctype(&mut self, change: impl FnOnce(&mut Token)) {
        if let Some(token) = self.current_token.as_mut() {
            change(token);
        }
    }
}

// =============================================================================
// RCDATA/RAWTEXT/Script Data End Tag Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    ///
    /// Used to determine if `</title>` should close the current `<title>` element.
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        self.current_tag.kind == TagKind::End
            && self
                .last_start_tag_name
                .as_deref()
                .is_some_and(|last| last == self.current_tag.name)
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer (in the order they were added to the buffer). Reconsume in the
    /// RCDATA state."
    ///
    /// Shared by the RAWTEXT, script data and script data escaped end tag name
    /// states, which only differ in the state they return to.
    pub(super) fn emit_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_str("</");
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_str(&buffer);
        // STEP 4: Discard the current end tag token
        self.current_tag = Tag::new(TagKind::Start);
        // STEP 5: "Reconsume in the ... state"
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state... if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    pub(super) fn check_duplicate_attribute(&mut self) {
        if self.current_tag.check_duplicate_attribute() {
            self.parse_error(ParseErrorKind::DuplicateAttribute);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer<'_> {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error at the current input position. Parse errors in
    /// HTML are not fatal; the tokenizer recovers and continues.
    pub(super) fn parse_error(&mut self, kind: ParseErrorKind) {
        let error = ParseError::new(kind, self.input.position());
        error::record(&mut self.errors, COMPONENT, self.diagnostics, error);
    }
}
