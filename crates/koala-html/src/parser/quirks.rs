//! Quirks mode detection from the DOCTYPE token.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use koala_dom::QuirksMode;

// All lowercase, for ASCII case-insensitive matching.

/// "The public identifier starts with: ..."
static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to: ..."
static QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// "The system identifier is set to: ..."
static QUIRKY_SYSTEM_MATCHES: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

/// "The public identifier starts with: ..." (limited-quirks mode)
static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

/// Quirks mode without a system identifier, limited-quirks mode with one.
static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

fn starts_with_ignore_ascii_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
}

fn matches_any(value: &str, list: &[&str]) -> bool {
    list.iter().any(|entry| value.eq_ignore_ascii_case(entry))
}

fn starts_with_any(value: &str, list: &[&str]) -> bool {
    list.iter()
        .any(|prefix| starts_with_ignore_ascii_case(value, prefix))
}

/// "If the DOCTYPE token's name is not "html", or the token's public
/// identifier is not missing, or the token's system identifier is neither
/// missing nor "about:legacy-compat", then there is a parse error."
pub(super) fn is_conforming_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
) -> bool {
    name == Some("html")
        && public_id.is_none()
        && system_id.is_none_or(|system| system == "about:legacy-compat")
}

/// Pick the document's quirks mode for a DOCTYPE token.
///
/// "Then, if the document is not an iframe srcdoc document, and the parser
/// cannot change the mode flag is false, and the DOCTYPE token matches one of
/// the conditions in the following list, then set the Document to quirks mode"
pub(super) fn quirks_mode_for_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    // "The force-quirks flag is set to on."
    // "The name is not "html"."
    if force_quirks || name != Some("html") {
        return QuirksMode::Quirks;
    }

    if public_id.is_some_and(|public| matches_any(public, QUIRKY_PUBLIC_MATCHES))
        || system_id.is_some_and(|system| matches_any(system, QUIRKY_SYSTEM_MATCHES))
        || public_id.is_some_and(|public| starts_with_any(public, QUIRKY_PUBLIC_PREFIXES))
    {
        return QuirksMode::Quirks;
    }

    // "The system identifier is missing and the public identifier starts with: ..."
    if system_id.is_none()
        && public_id.is_some_and(|public| starts_with_any(public, HTML4_PUBLIC_PREFIXES))
    {
        return QuirksMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    // parser cannot change the mode flag is false, and the DOCTYPE token
    // matches one of the conditions in the following list, then set the
    // Document to limited-quirks mode"
    if public_id.is_some_and(|public| {
        starts_with_any(public, LIMITED_QUIRKY_PUBLIC_PREFIXES)
            || starts_with_any(public, HTML4_PUBLIC_PREFIXES)
    }) {
        return QuirksMode::LimitedQuirks;
    }

    QuirksMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html5_doctype_is_standards_mode() {
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), None, None, false),
            QuirksMode::NoQuirks
        );
        assert!(is_conforming_doctype(Some("html"), None, None));
        assert!(is_conforming_doctype(
            Some("html"),
            None,
            Some("about:legacy-compat")
        ));
    }

    #[test]
    fn force_quirks_and_other_names_are_quirky() {
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), None, None, true),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(Some("foo"), None, None, false),
            QuirksMode::Quirks
        );
        assert!(!is_conforming_doctype(Some("foo"), None, None));
    }

    #[test]
    fn public_prefixes_match_case_insensitively() {
        assert_eq!(
            quirks_mode_for_doctype(
                Some("html"),
                Some("-//W3C//DTD HTML 3.2 Final//EN"),
                None,
                false
            ),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"),
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn html4_transitional_depends_on_system_identifier() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), public, None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            QuirksMode::LimitedQuirks
        );
        assert!(!is_conforming_doctype(Some("html"), public, None));
    }
}
