//! Parse errors.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether they are
//! syntactically correct or not. Certain points in the parsing algorithm are said to be
//! parse errors. The error handling for parse errors is well-defined."
//!
//! None of these abort parsing; they are collected in the order they were
//! detected and handed back to the caller alongside the result.

use koala_common::warning::warn_once;
use strum_macros::Display;
use thiserror::Error;

/// The kind of a parse error.
///
/// Tokenizer and preprocessor kinds use the codes from
/// [§ 13.2.2](https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-closing-of-empty-comment);
/// the tree construction kinds name the rule that was broken.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseErrorKind {
    // Input stream preprocessing
    ControlCharacterInInputStream,
    NoncharacterInInputStream,

    // Tokenization
    AbruptClosingOfEmptyComment,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    AbsenceOfDigitsInNumericCharacterReference,
    CdataInHtmlContent,
    CharacterReferenceOutsideUnicodeRange,
    ControlCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInDoctype,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidCharacterSequenceAfterDoctypeName,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingDoctypeName,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingEndTagName,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    MissingSemicolonAfterCharacterReference,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingWhitespaceBeforeDoctypeName,
    MissingWhitespaceBetweenAttributes,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    NestedComment,
    NoncharacterCharacterReference,
    NullCharacterReference,
    SurrogateCharacterReference,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnknownNamedCharacterReference,

    // Tree construction
    MissingDoctype,
    NonConformingDoctype,
    UnexpectedDoctype,
    UnexpectedStartTag,
    UnexpectedEndTag,
    UnexpectedCharacter,
    UnexpectedComment,
    UnexpectedEof,
    MisplacedStartTag,
    MisplacedCharacter,
    MisnestedEndTag,
    EndTagWithUnclosedElements,
    NestedForm,
    AdoptionAgencyBound,
    NonVoidHtmlElementStartTagWithTrailingSolidus,
}

/// A single parse error: what went wrong and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Code point offset into the raw input at which the error was detected.
    pub offset: usize,
}

impl ParseError {
    /// Create a parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Append an error to `errors`, echoing it to stderr when diagnostics are on.
pub(crate) fn record(
    errors: &mut Vec<ParseError>,
    component: &str,
    diagnostics: bool,
    error: ParseError,
) {
    if diagnostics {
        warn_once(component, &error.to_string());
    }
    errors.push(error);
}

#[cfg(test)]
mod tests {
    use super::{ParseError, ParseErrorKind};

    #[test]
    fn display_uses_kebab_case_codes() {
        let err = ParseError::new(ParseErrorKind::CdataInHtmlContent, 12);
        assert_eq!(err.to_string(), "cdata-in-html-content at offset 12");
        assert_eq!(
            ParseErrorKind::MissingSemicolonAfterCharacterReference.to_string(),
            "missing-semicolon-after-character-reference"
        );
        assert_eq!(ParseErrorKind::EofInTag.to_string(), "eof-in-tag");
    }
}
