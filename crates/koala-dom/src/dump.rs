//! Canonical tree dump.
//!
//! One node per line, two spaces of indentation per depth, children of the
//! Document at depth 0. Used as the oracle in tree construction tests, so the
//! format must stay stable.

use std::fmt::Write;

use crate::{Document, Namespace, NodeId, NodeType};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// Attributes that are namespaced on foreign elements. They are stored under
/// their prefixed name and dumped as `prefix name`.
const ADJUSTED_FOREIGN_ATTRIBUTES: &[&str] = &[
    "xlink:actuate",
    "xlink:arcrole",
    "xlink:href",
    "xlink:role",
    "xlink:show",
    "xlink:title",
    "xlink:type",
    "xml:lang",
    "xml:space",
    "xmlns:xlink",
];

impl Document {
    /// Dump the whole document in canonical form.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.dump_node(child, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        match &node.node_type {
            NodeType::Element(data) => {
                match data.namespace {
                    Namespace::Html => {
                        let _ = writeln!(out, "{indent}<{}>", data.tag_name);
                    }
                    ns => {
                        let _ = writeln!(out, "{indent}<{ns} {}>", data.tag_name);
                    }
                }

                let mut attrs: Vec<(&str, &str)> = data.attrs.iter().collect();
                attrs.sort_unstable();
                for (name, value) in attrs {
                    let shown = if data.namespace != Namespace::Html
                        && ADJUSTED_FOREIGN_ATTRIBUTES.contains(&name)
                    {
                        name.replacen(':', " ", 1)
                    } else {
                        name.to_string()
                    };
                    let _ = writeln!(out, "{indent}  {shown}=\"{value}\"");
                }

                if let Some(contents) = data.template_contents {
                    let _ = writeln!(out, "{indent}  content");
                    for &child in self.children(contents) {
                        self.dump_node(child, depth + 2, out);
                    }
                }
            }
            NodeType::Text(text) => {
                let _ = writeln!(out, "{indent}\"{}\"", escape_text(&text.data));
            }
            NodeType::Comment(data) => {
                let _ = writeln!(out, "{indent}<!-- {data} -->");
            }
            NodeType::DocumentType(doctype) => {
                if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                    let _ = writeln!(out, "{indent}<!DOCTYPE {}>", doctype.name);
                } else {
                    let _ = writeln!(
                        out,
                        "{indent}<!DOCTYPE {} \"{}\" \"{}\">",
                        doctype.name, doctype.public_id, doctype.system_id
                    );
                }
            }
            NodeType::Document | NodeType::DocumentFragment => {}
        }

        for &child in self.children(id) {
            self.dump_node(child, depth + 1, out);
        }
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_text;

    #[test]
    fn escapes_quotes_backslashes_and_controls() {
        assert_eq!(escape_text("a\"b\\c\nd\te\u{1}"), "a\\\"b\\\\c\\nd\\te\\u{1}");
    }

    #[test]
    fn leaves_non_ascii_alone() {
        assert_eq!(escape_text("caf\u{e9} \u{fffd}"), "caf\u{e9} \u{fffd}");
    }
}
