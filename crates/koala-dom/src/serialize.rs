//! HTML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use crate::{Document, Namespace, NodeId, NodeType};

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialises-as-void)
///
/// "If current node serializes as void, then continue on to the next child node at this point."
///
/// Elements that serialize as void: the void elements plus the legacy
/// `basefont`, `bgsound`, `frame`, `keygen` and `param`.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element, or if the parent of current node is a
/// noscript element and scripting is enabled for the node, then append the
/// value of current node's data IDL attribute literally."
const RAW_TEXT_PARENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

impl Document {
    /// Serialize the whole document back to markup.
    ///
    /// The output re-parses to the same tree for documents without raw text
    /// elements.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.serialize_children(self.root(), &mut out);
        out
    }

    /// Serialize the children of one node (the node's "inner HTML").
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let target = self.template_contents(id).unwrap_or(id);
        self.serialize_children(target, &mut out);
        out
    }

    fn serialize_children(&self, parent: NodeId, out: &mut String) {
        for &child in self.children(parent) {
            self.serialize_node(child, parent, out);
        }
    }

    fn serialize_node(&self, id: NodeId, parent: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for (name, value) in data.attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');

                if data.namespace == Namespace::Html
                    && VOID_ELEMENTS.contains(&data.tag_name.as_str())
                {
                    return;
                }

                // "If current node is a pre, textarea, or listing element, and the first
                // child node of the element, if any, is a Text node whose character data
                // has as its first character a U+000A LINE FEED (LF) character, then
                // append a U+000A LINE FEED (LF) character."
                if data.namespace == Namespace::Html
                    && matches!(data.tag_name.as_str(), "pre" | "textarea" | "listing")
                    && self
                        .first_child(id)
                        .and_then(|first| self.as_text(first))
                        .is_some_and(|text| text.starts_with('\n'))
                {
                    out.push('\n');
                }

                match data.template_contents {
                    Some(contents) => self.serialize_children(contents, out),
                    None => self.serialize_children(id, out),
                }

                out.push_str("</");
                out.push_str(&data.tag_name);
                out.push('>');
            }
            NodeType::Text(text) => {
                if self.is_raw_text_parent(parent) {
                    out.push_str(&text.data);
                } else {
                    escape_into(&text.data, false, out);
                }
            }
            NodeType::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            // An empty identifier is written as missing.
            NodeType::DocumentType(doctype) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(&doctype.name);
                if !doctype.public_id.is_empty() {
                    push_quoted_identifier(" PUBLIC ", &doctype.public_id, out);
                    if !doctype.system_id.is_empty() {
                        push_quoted_identifier(" ", &doctype.system_id, out);
                    }
                } else if !doctype.system_id.is_empty() {
                    push_quoted_identifier(" SYSTEM ", &doctype.system_id, out);
                }
                out.push('>');
            }
            NodeType::Document | NodeType::DocumentFragment => {
                self.serialize_children(id, out);
            }
        }
    }

    fn is_raw_text_parent(&self, parent: NodeId) -> bool {
        self.as_element(parent).is_some_and(|e| {
            e.namespace == Namespace::Html
                && (RAW_TEXT_PARENTS.contains(&e.tag_name.as_str())
                    || (e.tag_name == "noscript" && self.scripting_enabled()))
        })
    }
}

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Escaping a string (for the purposes of the algorithm above) consists of running the
/// following steps:
///   1. Replace any occurrence of the "&" character by the string "&amp;".
///   2. Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the string "&nbsp;".
///   3. If the algorithm was invoked in the attribute mode, replace any occurrences of the
///      """ character by the string "&quot;".
///   4. If the algorithm was not invoked in the attribute mode, replace any occurrences of
///      the "<" character by the string "&lt;", and any occurrences of the ">" character by
///      the string "&gt;"."
fn escape_into(s: &str, attribute_mode: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Write a DOCTYPE public or system identifier after `keyword`. Identifiers
/// cannot contain both quote characters, so one of them always works.
fn push_quoted_identifier(keyword: &str, identifier: &str, out: &mut String) {
    let quote = if identifier.contains('"') { '\'' } else { '"' };
    out.push_str(keyword);
    out.push(quote);
    out.push_str(identifier);
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::{escape_into, push_quoted_identifier};

    fn escape(s: &str, attribute_mode: bool) -> String {
        let mut out = String::new();
        escape_into(s, attribute_mode, &mut out);
        out
    }

    #[test]
    fn text_mode_escapes_angle_brackets_not_quotes() {
        assert_eq!(escape("a < b & \"c\" > d", false), "a &lt; b &amp; \"c\" &gt; d");
    }

    #[test]
    fn attribute_mode_escapes_quotes_not_angle_brackets() {
        assert_eq!(escape("<\"x\u{a0}\">", true), "<&quot;x&nbsp;&quot;>");
    }

    #[test]
    fn identifier_with_double_quote_uses_single_quotes() {
        let mut out = String::new();
        push_quoted_identifier(" SYSTEM ", "a\"b", &mut out);
        assert_eq!(out, " SYSTEM 'a\"b'");
    }
}
