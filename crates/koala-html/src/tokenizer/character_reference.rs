//! Character reference states for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use super::core::{HTMLTokenizer, TokenizerState};
use super::input::is_noncharacter;
use super::named_character_references::{LONGEST_NAME, longest_match};
use crate::error::ParseErrorKind;

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following table,
/// then find the row with that number in the first column, and set the character
/// reference code to the number in the second column of that row."
const WINDOWS_1252_REPLACEMENTS: &[(u32, char)] = &[
    (0x80, '\u{20AC}'), // EURO SIGN
    (0x82, '\u{201A}'), // SINGLE LOW-9 QUOTATION MARK
    (0x83, '\u{0192}'), // LATIN SMALL LETTER F WITH HOOK
    (0x84, '\u{201E}'), // DOUBLE LOW-9 QUOTATION MARK
    (0x85, '\u{2026}'), // HORIZONTAL ELLIPSIS
    (0x86, '\u{2020}'), // DAGGER
    (0x87, '\u{2021}'), // DOUBLE DAGGER
    (0x88, '\u{02C6}'), // MODIFIER LETTER CIRCUMFLEX ACCENT
    (0x89, '\u{2030}'), // PER MILLE SIGN
    (0x8A, '\u{0160}'), // LATIN CAPITAL LETTER S WITH CARON
    (0x8B, '\u{2039}'), // SINGLE LEFT-POINTING ANGLE QUOTATION MARK
    (0x8C, '\u{0152}'), // LATIN CAPITAL LIGATURE OE
    (0x8E, '\u{017D}'), // LATIN CAPITAL LETTER Z WITH CARON
    (0x91, '\u{2018}'), // LEFT SINGLE QUOTATION MARK
    (0x92, '\u{2019}'), // RIGHT SINGLE QUOTATION MARK
    (0x93, '\u{201C}'), // LEFT DOUBLE QUOTATION MARK
    (0x94, '\u{201D}'), // RIGHT DOUBLE QUOTATION MARK
    (0x95, '\u{2022}'), // BULLET
    (0x96, '\u{2013}'), // EN DASH
    (0x97, '\u{2014}'), // EM DASH
    (0x98, '\u{02DC}'), // SMALL TILDE
    (0x99, '\u{2122}'), // TRADE MARK SIGN
    (0x9A, '\u{0161}'), // LATIN SMALL LETTER S WITH CARON
    (0x9B, '\u{203A}'), // SINGLE RIGHT-POINTING ANGLE QUOTATION MARK
    (0x9C, '\u{0153}'), // LATIN SMALL LIGATURE OE
    (0x9E, '\u{017E}'), // LATIN SMALL LETTER Z WITH CARON
    (0x9F, '\u{0178}'), // LATIN CAPITAL LETTER Y WITH DIAERESIS
];

/// Clamp for the character reference code while digits accumulate. Anything
/// above the Unicode range is treated the same, so there is no need to keep
/// counting.
const CODE_LIMIT: u32 = 0x11_0000;

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Map a character reference code to the character it stands for, along with
/// the parse error it raises, if any.
#[must_use]
pub fn resolve_numeric_reference(code: u32) -> (char, Option<ParseErrorKind>) {
    // "If the number is 0x00, then this is a null-character-reference parse error.
    // Set the character reference code to 0xFFFD."
    if code == 0 {
        return ('\u{FFFD}', Some(ParseErrorKind::NullCharacterReference));
    }
    // "If the number is greater than 0x10FFFF, then this is a
    // character-reference-outside-unicode-range parse error. Set the character
    // reference code to 0xFFFD."
    if code > 0x10_FFFF {
        return (
            '\u{FFFD}',
            Some(ParseErrorKind::CharacterReferenceOutsideUnicodeRange),
        );
    }
    // "If the number is a surrogate, then this is a surrogate-character-reference
    // parse error. Set the character reference code to 0xFFFD."
    let Some(c) = char::from_u32(code) else {
        return ('\u{FFFD}', Some(ParseErrorKind::SurrogateCharacterReference));
    };
    // "If the number is a noncharacter, then this is a noncharacter-character-reference
    // parse error."
    if is_noncharacter(c) {
        return (c, Some(ParseErrorKind::NoncharacterCharacterReference));
    }
    // "If the number is 0x0D, or a control that's not ASCII whitespace, then this is a
    // control-character-reference parse error."
    let is_control = code <= 0x1F || (0x7F..=0x9F).contains(&code);
    let is_ascii_whitespace = matches!(code, 0x09 | 0x0A | 0x0C | 0x20);
    if code == 0x0D || (is_control && !is_ascii_whitespace) {
        let replaced = WINDOWS_1252_REPLACEMENTS
            .iter()
            .find(|(from, _)| *from == code)
            .map_or(c, |&(_, to)| to);
        return (replaced, Some(ParseErrorKind::ControlCharacterReference));
    }
    (c, None)
}

impl HTMLTokenizer<'_> {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// Returns true if the return state is an attribute value state.
    /// Per spec: "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// "Flush code points consumed as a character reference"
    /// Per spec: "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            for c in buffer.chars() {
                self.current_tag.append_to_attribute_value(c);
            }
        } else {
            self.emit_str(&buffer);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Looks at the next character instead of consuming it; "reconsume" below
    /// means leaving it in the input for the next state.
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026 AMPERSAND (&)
        // character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');

        match self.peek_codepoint(0) {
            // "ASCII alphanumeric - Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.switch_to(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#) - Append the current input character to the temporary
            // buffer. Switch to the numeric character reference state."
            Some('#') => {
                let _ = self.consume();
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else - Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.switch_to(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    pub(super) fn handle_named_character_reference_state(&mut self) {
        // "Consume the maximum number of characters possible, where the consumed
        // characters are one of the identifiers in the first column of the named
        // character references table. Append each character to the temporary buffer
        // when it's consumed."
        let mut candidate = String::new();
        while candidate.len() < LONGEST_NAME {
            match self.peek_codepoint(candidate.len()) {
                Some(c) if c.is_ascii_alphanumeric() => candidate.push(c),
                Some(';') => {
                    candidate.push(';');
                    break;
                }
                _ => break,
            }
        }

        let Some((length, replacement)) = longest_match(&candidate) else {
            // "Otherwise - Flush code points consumed as a character reference. Switch to
            // the ambiguous ampersand state."
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return;
        };

        for _ in 0..length {
            if let Some(c) = self.consume() {
                self.temporary_buffer.push(c);
            }
        }

        // "If the character reference was consumed as part of an attribute, and the last
        // character matched is not a U+003B SEMICOLON character (;), and the next input
        // character is either a U+003D EQUALS SIGN character (=) or an ASCII alphanumeric,
        // then, for historical reasons, flush code points consumed as a character
        // reference and switch to the return state."
        //
        // The same rule applies outside attributes: a legacy name glued to further
        // alphanumerics or `=` is left as literal text.
        let ends_with_semicolon = self.temporary_buffer.ends_with(';');
        if !ends_with_semicolon
            && self
                .peek_codepoint(0)
                .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return;
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;), then
        // this is a missing-semicolon-after-character-reference parse error."
        if !ends_with_semicolon {
            self.parse_error(ParseErrorKind::MissingSemicolonAfterCharacterReference);
        }

        // "Set the temporary buffer to the empty string. Append one or two characters
        // corresponding to the character reference name (as given by the second column of
        // the named character references table) to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "ASCII alphanumeric - If the character reference was consumed as part of an
            // attribute, then append the current input character to the current attribute's
            // value. Otherwise, emit the current input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_consumed_as_part_of_attribute() {
                    self.current_tag.append_to_attribute_value(c);
                } else {
                    self.emit_character_token(c);
                }
            }
            // "U+003B SEMICOLON (;) - This is an unknown-named-character-reference parse
            // error. Reconsume in the return state."
            Some(';') => {
                self.parse_error(ParseErrorKind::UnknownNamedCharacterReference);
                self.reconsume_in(self.return_state);
            }
            _ => self.reconsume_in(self.return_state),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            // "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X - Append the
            // current input character to the temporary buffer. Switch to the hexadecimal
            // character reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_numeric_character_reference_start_state(&mut self, radix: u32) {
        match self.current_input_character {
            Some(c) if c.is_digit(radix) => self.reconsume_in(if radix == 16 {
                TokenizerState::HexadecimalCharacterReference
            } else {
                TokenizerState::DecimalCharacterReference
            }),
            // "Anything else - This is an absence-of-digits-in-numeric-character-reference
            // parse error. Flush code points consumed as a character reference. Reconsume
            // in the return state."
            _ => {
                self.parse_error(ParseErrorKind::AbsenceOfDigitsInNumericCharacterReference);
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_numeric_character_reference_digits_state(&mut self, radix: u32) {
        match self.current_input_character {
            // "Multiply the character reference code by 16. Add a numeric version of the
            // current input character to the character reference code."
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or(0);
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(CODE_LIMIT);
            }
            // "U+003B SEMICOLON - Switch to the numeric character reference end state."
            Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEnd),
            // "Anything else - This is a missing-semicolon-after-character-reference parse
            // error. Reconsume in the numeric character reference end state."
            _ => {
                self.parse_error(ParseErrorKind::MissingSemicolonAfterCharacterReference);
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Does not consume. If the previous state asked to reconsume, the pending
    /// character is handed on to the return state.
    pub(super) fn handle_numeric_character_reference_end_state(&mut self) {
        let (c, error) = resolve_numeric_reference(self.character_reference_code);
        if let Some(kind) = error {
            self.parse_error(kind);
        }
        // "Set the temporary buffer to the empty string. Append a code point equal to the
        // character reference code to the temporary buffer. Flush code points consumed as
        // a character reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push(c);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_numeric_reference;
    use crate::error::ParseErrorKind;

    #[test]
    fn plain_code_points_pass_through() {
        assert_eq!(resolve_numeric_reference(0x41), ('A', None));
        assert_eq!(resolve_numeric_reference(0x1F600), ('\u{1F600}', None));
    }

    #[test]
    fn windows_1252_remap() {
        assert_eq!(
            resolve_numeric_reference(0x80),
            ('\u{20AC}', Some(ParseErrorKind::ControlCharacterReference))
        );
        assert_eq!(
            resolve_numeric_reference(0x9F),
            ('\u{0178}', Some(ParseErrorKind::ControlCharacterReference))
        );
        // 0x81 has no mapping and stays as is.
        assert_eq!(
            resolve_numeric_reference(0x81),
            ('\u{81}', Some(ParseErrorKind::ControlCharacterReference))
        );
    }

    #[test]
    fn invalid_code_points_become_replacement_character() {
        assert_eq!(
            resolve_numeric_reference(0),
            ('\u{FFFD}', Some(ParseErrorKind::NullCharacterReference))
        );
        assert_eq!(
            resolve_numeric_reference(0xD800),
            ('\u{FFFD}', Some(ParseErrorKind::SurrogateCharacterReference))
        );
        assert_eq!(
            resolve_numeric_reference(0x11_0000),
            (
                '\u{FFFD}',
                Some(ParseErrorKind::CharacterReferenceOutsideUnicodeRange)
            )
        );
    }

    #[test]
    fn carriage_return_and_noncharacters_are_reported() {
        assert_eq!(
            resolve_numeric_reference(0x0D),
            ('\r', Some(ParseErrorKind::ControlCharacterReference))
        );
        assert_eq!(
            resolve_numeric_reference(0xFFFE),
            ('\u{FFFE}', Some(ParseErrorKind::NoncharacterCharacterReference))
        );
        assert_eq!(resolve_numeric_reference(0x0A), ('\n', None));
    }
}
