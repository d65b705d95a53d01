//! The input stream.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "The input stream consists of the characters pushed into it as the input byte
//! stream is decoded or from the various APIs that directly manipulate the input
//! stream."

use std::collections::VecDeque;
use std::str::Chars;

use crate::error::{ParseError, ParseErrorKind};

/// A lazily normalized stream of code points with bounded lookahead.
///
/// Every code point is yielded exactly once. Line endings are normalized as
/// they are pulled from the underlying string, and each yielded code point
/// remembers its offset in the raw input.
#[derive(Debug, Clone)]
pub struct InputStream<'a> {
    chars: Chars<'a>,
    /// Normalized code points that were peeked but not yet consumed.
    lookahead: VecDeque<(char, usize)>,
    /// Number of raw code points pulled from `chars` so far.
    raw_offset: usize,
    /// Raw offset of the most recently consumed code point.
    position: usize,
    /// Set once a consume found nothing left.
    at_end: bool,
}

impl<'a> InputStream<'a> {
    /// Wrap a decoded document.
    ///
    /// [§ 13.2.3.1](https://html.spec.whatwg.org/multipage/parsing.html#parsing-with-a-known-character-encoding)
    /// A leading U+FEFF BYTE ORDER MARK is not part of the document and is skipped.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let mut raw_offset = 0;
        if input.starts_with('\u{FEFF}') {
            let _ = chars.next();
            raw_offset = 1;
        }
        Self {
            chars,
            lookahead: VecDeque::new(),
            raw_offset,
            position: raw_offset,
            at_end: false,
        }
    }

    /// "Before the tokenization stage, the input stream must be preprocessed by
    /// normalizing newlines."
    ///
    /// "To normalize newlines in a string, replace every U+000D CR U+000A LF code point
    /// pair with a single U+000A LF code point, and then replace every remaining
    /// U+000D CR code point with a U+000A LF code point."
    fn pull(&mut self) -> Option<(char, usize)> {
        let c = self.chars.next()?;
        let offset = self.raw_offset;
        self.raw_offset += 1;
        if c == '\r' {
            if self.chars.clone().next() == Some('\n') {
                let _ = self.chars.next();
                self.raw_offset += 1;
            }
            return Some(('\n', offset));
        }
        Some((c, offset))
    }

    fn fill(&mut self, count: usize) {
        while self.lookahead.len() < count {
            match self.pull() {
                Some(entry) => self.lookahead.push_back(entry),
                None => break,
            }
        }
    }

    /// Consume the next code point, reporting invalid code points into `errors`.
    ///
    /// "Any occurrences of any characters in the ranges U+0001 to U+0008, U+000E to
    /// U+001F, U+007F to U+009F, U+FDD0 to U+FDEF, and characters U+000B, U+FFFE,
    /// U+FFFF, ... are parse errors."
    pub fn next_char(&mut self, errors: &mut Vec<ParseError>) -> Option<char> {
        self.fill(1);
        let Some((c, offset)) = self.lookahead.pop_front() else {
            self.at_end = true;
            return None;
        };
        self.position = offset;
        if is_noncharacter(c) {
            errors.push(ParseError::new(ParseErrorKind::NoncharacterInInputStream, offset));
        } else if is_reportable_control(c) {
            errors.push(ParseError::new(
                ParseErrorKind::ControlCharacterInInputStream,
                offset,
            ));
        }
        Some(c)
    }

    /// Look at the code point `n` positions ahead without consuming anything.
    /// `peek(0)` is the next code point.
    pub fn peek(&mut self, n: usize) -> Option<char> {
        self.fill(n + 1);
        self.lookahead.get(n).map(|&(c, _)| c)
    }

    /// Raw offset of the most recently consumed code point, or of the end of
    /// input once everything has been consumed.
    #[must_use]
    pub const fn position(&self) -> usize {
        if self.at_end {
            self.raw_offset
        } else {
            self.position
        }
    }

    /// Returns true once every code point has been consumed.
    pub fn is_exhausted(&mut self) -> bool {
        self.peek(0).is_none()
    }
}

/// [§ 4.6 Code points](https://infra.spec.whatwg.org/#noncharacter)
///
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF, inclusive,
/// or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
#[must_use]
pub const fn is_noncharacter(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0xFDD0..=0xFDEF) || (cp & 0xFFFE) == 0xFFFE
}

/// "A control is a C0 control or a code point in the range U+007F DELETE to U+009F
/// APPLICATION PROGRAM COMMAND, inclusive."
///
/// ASCII whitespace and NULL are controls but are not reported: NULL is
/// handled by each tokenizer state instead.
#[must_use]
pub const fn is_reportable_control(c: char) -> bool {
    matches!(c, '\u{1}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

#[cfg(test)]
mod tests {
    use super::InputStream;
    use crate::error::ParseErrorKind;

    fn drain(input: &str) -> (String, Vec<ParseErrorKind>) {
        let mut stream = InputStream::new(input);
        let mut errors = Vec::new();
        let mut out = String::new();
        while let Some(c) = stream.next_char(&mut errors) {
            out.push(c);
        }
        (out, errors.into_iter().map(|e| e.kind).collect())
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(drain("a\r\nb\rc\n").0, "a\nb\nc\n");
        assert_eq!(drain("\r\r\n").0, "\n\n");
    }

    #[test]
    fn skips_leading_bom_only() {
        assert_eq!(drain("\u{FEFF}a\u{FEFF}").0, "a\u{FEFF}");
    }

    #[test]
    fn reports_controls_and_noncharacters() {
        let (out, errors) = drain("a\u{1}\t\u{FFFF}\0");
        assert_eq!(out, "a\u{1}\t\u{FFFF}\0");
        assert_eq!(
            errors,
            vec![
                ParseErrorKind::ControlCharacterInInputStream,
                ParseErrorKind::NoncharacterInInputStream,
            ]
        );
    }

    #[test]
    fn offsets_count_raw_code_points() {
        let mut stream = InputStream::new("\r\nx");
        let mut errors = Vec::new();
        assert_eq!(stream.next_char(&mut errors), Some('\n'));
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.next_char(&mut errors), Some('x'));
        assert_eq!(stream.position(), 2);
        assert_eq!(stream.next_char(&mut errors), None);
        assert_eq!(stream.position(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut stream = InputStream::new("ab");
        let mut errors = Vec::new();
        assert_eq!(stream.peek(1), Some('b'));
        assert_eq!(stream.peek(2), None);
        assert_eq!(stream.next_char(&mut errors), Some('a'));
        assert!(!stream.is_exhausted());
    }
}
