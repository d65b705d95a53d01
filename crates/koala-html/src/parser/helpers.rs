//! Helper algorithms shared by the insertion modes.
//!
//! [§ 13.2.4 Parse state](https://html.spec.whatwg.org/multipage/parsing.html#parse-state)
//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//!
//! This module contains:
//! - Node insertion ("the appropriate place for inserting a node", foster parenting)
//! - Stack of open elements queries and element scopes
//! - Implied end tags
//! - The list of active formatting elements
//! - Resetting the insertion mode

use koala_dom::{AttributesMap, DoctypeData, ElementData, Namespace, NodeId, NodeType, TextData};

use super::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
use crate::error::ParseErrorKind;
use crate::tokenizer::{Token, TokenizerState};

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element types that bound each flavour of "has an element in scope".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope"
    ListItem,
    /// "has an element in button scope"
    Button,
    /// "has an element in table scope"
    Table,
    /// "has an element in select scope"
    Select,
}

impl Scope {
    /// Returns true if `element` is one of the element types that end a
    /// search in this scope.
    fn is_boundary(self, element: &ElementData) -> bool {
        let name = element.tag_name.as_str();
        match self {
            Self::Default => is_default_scope_boundary(element),
            // "the following element types: All the element types listed above for
            // the has an element in scope algorithm. ol in the HTML namespace. ul in
            // the HTML namespace"
            Self::ListItem => {
                is_default_scope_boundary(element)
                    || (element.namespace == Namespace::Html && matches!(name, "ol" | "ul"))
            }
            // "...button in the HTML namespace"
            Self::Button => {
                is_default_scope_boundary(element)
                    || (element.namespace == Namespace::Html && name == "button")
            }
            // "html in the HTML namespace, table in the HTML namespace, template in
            // the HTML namespace"
            Self::Table => {
                element.namespace == Namespace::Html
                    && matches!(name, "html" | "table" | "template")
            }
            // "All element types except the following: optgroup in the HTML
            // namespace, option in the HTML namespace"
            Self::Select => {
                !(element.namespace == Namespace::Html && matches!(name, "optgroup" | "option"))
            }
        }
    }
}

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// "applet, caption, html, table, td, th, marquee, object, template (HTML);
/// mi, mo, mn, ms, mtext, annotation-xml (MathML); foreignObject, desc, title (SVG)"
fn is_default_scope_boundary(element: &ElementData) -> bool {
    let name = element.tag_name.as_str();
    match element.namespace {
        Namespace::Html => matches!(
            name,
            "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object" | "template"
        ),
        Namespace::MathMl => matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"),
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
    }
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules:
/// ... they are collectively known as special elements."
pub(super) fn is_special_element(element: &ElementData) -> bool {
    let name = element.tag_name.as_str();
    match element.namespace {
        Namespace::Html => matches!(
            name,
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathMl => matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"),
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
    }
}

/// [§ 13.2.6.2 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
const THOROUGH_IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
    "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
pub(super) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

// =============================================================================
// Stack of Open Elements
// =============================================================================

impl HTMLParser<'_> {
    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise, the
    /// adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        match self.context_element {
            Some(context) if self.stack_of_open_elements.len() == 1 => Some(context),
            _ => self.current_node(),
        }
    }

    pub(super) fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.document.as_element(id)
    }

    /// Returns true if `id` is an HTML element with the given local name.
    pub(super) fn is_html_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.is_html(name))
    }

    /// Returns true if `id` is an HTML element with one of the given local names.
    pub(super) fn is_html_element_one_of(&self, id: NodeId, names: &[&str]) -> bool {
        self.element(id)
            .is_some_and(|e| e.namespace == Namespace::Html && names.contains(&e.tag_name.as_str()))
    }

    /// "If the current node is an HTML element whose tag name is ..."
    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_html_element(id, name))
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_html_element_one_of(id, names))
    }

    /// Returns true if an HTML element with this name is anywhere on the stack.
    pub(super) fn stack_contains(&self, name: &str) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&id| self.is_html_element(id, name))
    }

    /// "Pop the current node off the stack of open elements."
    pub(super) fn pop_current_node(&mut self) {
        let _ = self.stack_of_open_elements.pop();
    }

    /// "Pop elements from the stack of open elements until an X element has
    /// been popped from the stack."
    pub(super) fn pop_until(&mut self, name: &str) {
        self.pop_until_one_of(&[name]);
    }

    /// "...until one of the X, Y or Z elements has been popped from the stack."
    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.is_html_element_one_of(id, names) {
                break;
            }
        }
    }

    /// Pop elements until `node` itself has been popped.
    pub(super) fn pop_until_node(&mut self, node: NodeId) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if id == node {
                break;
            }
        }
    }

    /// "Remove node from the stack of open elements."
    pub(super) fn remove_from_stack(&mut self, node: NodeId) {
        if let Some(pos) = self.stack_of_open_elements.iter().position(|&id| id == node) {
            let _ = self.stack_of_open_elements.remove(pos);
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "The stack of open elements is said to have an element target node in a
    /// specific scope consisting of a list of element types list when the
    /// following algorithm terminates in a match state:"
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_in_specific_scope(&self, scope: Scope, is_target: impl Fn(NodeId, &ElementData) -> bool) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            let Some(element) = self.element(node) else {
                continue;
            };
            if is_target(node, element) {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// "has an X element in [scope]", for an HTML element named `name`.
    pub(super) fn has_element_in_scope(&self, name: &str, scope: Scope) -> bool {
        self.has_in_specific_scope(scope, |_, element| element.is_html(name))
    }

    /// "has an X, Y, or Z element in [scope]"
    pub(super) fn has_any_element_in_scope(&self, names: &[&str], scope: Scope) -> bool {
        self.has_in_specific_scope(scope, |_, element| {
            element.namespace == Namespace::Html && names.contains(&element.tag_name.as_str())
        })
    }

    /// "has the particular element node in [scope]"
    pub(super) fn has_node_in_scope(&self, target: NodeId, scope: Scope) -> bool {
        self.has_in_specific_scope(scope, |node, _| node == target)
    }

    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "When the steps below require the user agent to generate implied end tags,
    /// then, while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an rp
    /// element, an rt element, or an rtc element, the user agent must pop the
    /// current node off the stack of open elements."
    ///
    /// "If a step requires the user agent to generate implied end tags but lists
    /// an element to exclude from the process, then the user agent must perform
    /// the above steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(current) = self.current_node() {
            let Some(element) = self.element(current) else {
                break;
            };
            let name = element.tag_name.as_str();
            if element.namespace != Namespace::Html
                || !IMPLIED_END_TAG_ELEMENTS.contains(&name)
                || exclude == Some(name)
            {
                break;
            }
            self.pop_current_node();
        }
    }

    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current_node_is_one_of(THOROUGH_IMPLIED_END_TAG_ELEMENTS) {
            self.pop_current_node();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must generate implied end tags, except for p
    /// elements. If the current node is not a p element, then this is a parse
    /// error. Pop elements from the stack of open elements until a p element
    /// has been popped from the stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error(ParseErrorKind::MisnestedEndTag);
        }
        self.pop_until("p");
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn close_p_element_in_button_scope(&mut self) {
        if self.has_element_in_scope("p", Scope::Button) {
            self.close_p_element();
        }
    }

    /// The common tail of many end tag rules: generate implied end tags,
    /// report the current node if it is not `name`, and pop through `name`.
    pub(super) fn close_element(&mut self, name: &str) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is(name) {
            self.parse_error(ParseErrorKind::MisnestedEndTag);
        }
        self.pop_until(name);
    }
}

// =============================================================================
// Creating and Inserting Nodes
// =============================================================================

impl HTMLParser<'_> {
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps:"
    ///
    /// Returns `(parent_id, Option<before_id>)`. When `before_id` is `Some`,
    /// the node goes immediately before it; otherwise it is appended.
    pub(super) fn appropriate_place_for_inserting(
        &self,
        override_target: Option<NodeId>,
    ) -> (NodeId, Option<NodeId>) {
        // STEP 1: "If there was an override target specified, then let target be
        // the override target. Otherwise, let target be the current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or(NodeId::ROOT);

        // STEP 2: "Determine the adjusted insertion location using the first
        // matching steps from the following list:"
        // "If foster parenting is enabled and target is a table, tbody, tfoot,
        // thead, or tr element"
        let (parent, before) = if self.foster_parenting
            && self.is_html_element_one_of(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            self.foster_parent_location()
        } else {
            // "Otherwise: Let adjusted insertion location be inside target, after
            // its last child (if any)."
            (target, None)
        };

        // STEP 3: "If the adjusted insertion location is inside a template element,
        // let it instead be inside the template element's template contents,
        // after its last child (if any)."
        if before.is_none()
            && let Some(contents) = self.document.template_contents(parent)
        {
            return (contents, None);
        }

        (parent, before)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// The foster parenting branch of "the appropriate place for inserting a node".
    fn foster_parent_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 2.1: "Let last template be the last template element in the stack
        // of open elements, if any."
        let last_template = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html_element(id, "template"));

        // STEP 2.2: "Let last table be the last table element in the stack of open
        // elements, if any."
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html_element(id, "table"));

        // STEP 2.3: "If there is a last template and either there is no last table,
        // or there is one, but last template is lower (more recently added) than
        // last table in the stack of open elements, then: let adjusted insertion
        // location be inside last template's template contents, after its last
        // child (if any), and abort these steps."
        if let Some(template_pos) = last_template
            && last_table.is_none_or(|table_pos| template_pos > table_pos)
        {
            let template = self.stack_of_open_elements[template_pos];
            return (self.document.template_contents(template).unwrap_or(template), None);
        }

        // STEP 2.4: "If there is no last table, then let adjusted insertion location
        // be inside the first element in the stack of open elements (the html
        // element), after its last child (if any), and abort these steps.
        // (fragment case)"
        let Some(table_pos) = last_table else {
            let first = self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or(NodeId::ROOT);
            return (first, None);
        };

        // STEP 2.5: "If last table has a parent node, then let adjusted insertion
        // location be inside last table's parent node, immediately before last
        // table, and abort these steps."
        let table = self.stack_of_open_elements[table_pos];
        if let Some(parent) = self.document.parent(table) {
            return (parent, Some(table));
        }

        // STEP 2.6: "Let previous element be the element immediately above last
        // table in the stack of open elements."
        // STEP 2.7: "Let adjusted insertion location be inside previous element,
        // after its last child (if any)."
        let previous = table_pos
            .checked_sub(1)
            .map_or(NodeId::ROOT, |pos| self.stack_of_open_elements[pos]);
        (previous, None)
    }

    /// Insert `node` at a location computed by
    /// [`appropriate_place_for_inserting`](Self::appropriate_place_for_inserting).
    pub(super) fn insert_at(&mut self, (parent, before): (NodeId, Option<NodeId>), node: NodeId) {
        match before {
            Some(reference) => self.document.insert_before(parent, node, reference),
            None => self.document.append_child(parent, node),
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token" in the given namespace. The element is
    /// not inserted anywhere.
    ///
    /// Template elements in the HTML namespace get an empty template contents
    /// fragment.
    pub(super) fn create_element_for_token(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        let name = token.tag_name().unwrap_or_default();
        let attrs: AttributesMap = token
            .attributes()
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
            .collect();

        let template_contents = (namespace == Namespace::Html && name == "template")
            .then(|| self.document.alloc(NodeType::DocumentFragment));

        self.document.create_element(ElementData {
            tag_name: name.to_string(),
            namespace,
            attrs,
            template_contents,
        })
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "When the steps below require the user agent to insert a foreign element
    /// for a token in a given namespace and with a boolean onlyAddToElementStack,
    /// the user agent must run these steps:"
    pub(super) fn insert_foreign_element(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        // for inserting a node."
        let location = self.appropriate_place_for_inserting(None);

        // STEP 2: "Let element be the result of creating an element for the token
        // in the given namespace, with the intended parent being the element in
        // which the adjusted insertion location finds itself."
        let element = self.create_element_for_token(token, namespace);

        // STEP 3: "If onlyAddToElementStack is false, then run insert an element
        // at the adjusted insertion location with element."
        self.insert_at(location, element);

        // STEP 4: "Push element onto the stack of open elements so that it is the
        // new current node."
        self.stack_of_open_elements.push(element);
        element
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        self.insert_foreign_element(token, Namespace::Html)
    }

    /// Insert an HTML element for "a start tag token with the tag name X and no
    /// attributes", as the implied `html`, `head`, `body`, `tbody`, `tr` and
    /// `colgroup` elements are.
    pub(super) fn insert_html_element_named(&mut self, name: &str) -> NodeId {
        self.insert_html_element(&Token::new_start_tag(name))
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "When the steps below require the user agent to insert a character
    /// while processing a token, the user agent must run the following steps..."
    pub(super) fn insert_character(&mut self, c: char) {
        // STEP 2: "Let the adjusted insertion location be the appropriate place
        //         for inserting a node."
        let (parent, before) = self.appropriate_place_for_inserting(None);

        // STEP 3: "If the adjusted insertion location is in a Document node, then
        //         return."
        if parent == NodeId::ROOT {
            return;
        }

        // STEP 4: "If there is a Text node immediately before the adjusted
        //         insertion location, then append data to that Text node's data."
        let previous = match before {
            Some(reference) => self.document.prev_sibling(reference),
            None => self.document.last_child(parent),
        };
        if let Some(previous) = previous
            && let Some(node) = self.document.get_mut(previous)
            && let NodeType::Text(text) = &mut node.node_type
            && text.mergeable
        {
            text.data.push(c);
            return;
        }

        // "Otherwise, create a new Text node whose data is data and whose node
        //  document is the same as that of the element in which the adjusted
        //  insertion location finds itself, and insert the newly created node at
        //  the adjusted insertion location."
        let text = self.document.alloc(NodeType::Text(TextData {
            data: c.to_string(),
            mergeable: true,
        }));
        self.insert_at((parent, before), text);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "When the steps below require the user agent to insert a comment while
    /// processing a comment token, optionally with an explicitly insertion
    /// position position, the user agent must run the following steps:"
    pub(super) fn insert_comment(&mut self, data: &str, position: Option<NodeId>) {
        // STEP 2: "If position was specified, then let the adjusted insertion
        // location be position. Otherwise, let adjusted insertion location be the
        // appropriate place for inserting a node."
        let location = match position {
            Some(parent) => (parent, None),
            None => self.appropriate_place_for_inserting(None),
        };
        // STEP 3: "Create a Comment node whose data attribute is set to data..."
        let comment = self.document.create_comment(data);
        // STEP 4: "Insert the newly created node at the adjusted insertion location."
        self.insert_at(location, comment);
    }

    /// Append a DocumentType node to the Document node.
    pub(super) fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let doctype = self.document.alloc(NodeType::DocumentType(DoctypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        self.document.append_child(NodeId::ROOT, doctype);
    }

    /// "...add the attribute and its corresponding value to that element" for
    /// every attribute on `token` the element does not already have.
    pub(super) fn merge_attributes(&mut self, target: NodeId, token: &Token) {
        if let Some(element) = self.document.as_element_mut(target) {
            for attr in token.attributes() {
                let _ = element.attrs.insert_if_absent(&attr.name, &attr.value);
            }
        }
    }

    /// [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag)
    pub(super) const fn acknowledge_self_closing_flag(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_text_only_element(&mut self, token: &Token, state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(token);
        // STEP 2: "If the algorithm that was invoked is the generic raw text element
        // parsing algorithm, switch the tokenizer to the RAWTEXT state; otherwise the
        // algorithm invoked was the generic RCDATA element parsing algorithm, switch
        // the tokenizer to the RCDATA state."
        self.tokenizer.switch_to(state);
        // STEP 3: "Let the original insertion mode be the current insertion mode."
        self.original_insertion_mode = self.insertion_mode;
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.insertion_mode = InsertionMode::Text;
    }
}

// =============================================================================
// The List of Active Formatting Elements
// =============================================================================

impl HTMLParser<'_> {
    /// Index of `node` in the list of active formatting elements.
    pub(super) fn active_formatting_position(&self, node: NodeId) -> Option<usize> {
        self.active_formatting_elements.iter().position(
            |entry| matches!(entry, ActiveFormattingElement::Element { node_id, .. } if *node_id == node),
        )
    }

    /// Remove `node` from the list of active formatting elements, if present.
    pub(super) fn remove_from_active_formatting_elements(&mut self, node: NodeId) {
        if let Some(pos) = self.active_formatting_position(node) {
            let _ = self.active_formatting_elements.remove(pos);
        }
    }

    /// Insert a marker at the end of the list of active formatting elements.
    pub(super) fn insert_marker(&mut self) {
        self.active_formatting_elements
            .push(ActiveFormattingElement::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "When the steps below require the UA to push onto the list of active
    /// formatting elements an element element, the UA must perform the
    /// following steps:"
    ///
    /// Includes the Noah's Ark clause: "If there are already three elements
    /// in the list of active formatting elements after the last marker, if
    /// any, or anywhere in the list if there are no markers, that have the
    /// same tag name, namespace, and attributes as element, then remove the
    /// earliest such element from the list of active formatting elements."
    pub(super) fn push_active_formatting_element(&mut self, node_id: NodeId, token: &Token) {
        // STEP 1: Count matching elements after the last marker.
        let mut count = 0;
        let mut earliest_match = None;
        for (i, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                ActiveFormattingElement::Marker => break,
                ActiveFormattingElement::Element {
                    token: entry_token, ..
                } => {
                    if Self::same_tag_and_attributes(entry_token, token) {
                        count += 1;
                        earliest_match = Some(i);
                    }
                }
            }
        }

        // STEP 2: If 3 or more matches, remove the earliest.
        if count >= 3
            && let Some(index) = earliest_match
        {
            let _ = self.active_formatting_elements.remove(index);
        }

        // STEP 3: "Add element to the list of active formatting elements."
        self.active_formatting_elements
            .push(ActiveFormattingElement::Element {
                node_id,
                token: token.clone(),
            });
    }

    /// "...the attributes must be compared as they were when the elements were
    /// created by the parser; two elements have the same attributes if all their
    /// parsed attributes can be paired such that the two attributes in each pair
    /// have identical names, namespaces, and values (the order of the attributes
    /// does not matter)."
    fn same_tag_and_attributes(a: &Token, b: &Token) -> bool {
        let (a_attrs, b_attrs) = (a.attributes(), b.attributes());
        a.tag_name() == b.tag_name()
            && a_attrs.len() == b_attrs.len()
            && a_attrs.iter().all(|attr| b_attrs.contains(attr))
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "When the steps below require the UA to reconstruct the active formatting
    /// elements, the UA must perform the following steps:"
    ///
    /// This algorithm has two phases:
    /// - Rewind phase (steps 4-6): Walk backwards to find where to start
    /// - Create phase (steps 7-10): Walk forwards, creating elements
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of active
        //          formatting elements is a marker, or if it is an element that
        //          is in the stack of open elements, then there is nothing to
        //          reconstruct; stop this algorithm."
        match self.active_formatting_elements.last() {
            None | Some(ActiveFormattingElement::Marker) => return,
            Some(ActiveFormattingElement::Element { node_id, .. }) => {
                if self.stack_of_open_elements.contains(node_id) {
                    return;
                }
            }
        }

        // STEP 3: "Let entry be the last (most recently added) element in the
        //          list of active formatting elements."
        let mut entry_index = self.active_formatting_elements.len() - 1;

        // STEP 4-6: Rewind phase
        loop {
            // STEP 4: "Rewind: If there are no entries before entry in the list of
            // active formatting elements, then jump to the step labeled create."
            if entry_index == 0 {
                break;
            }

            // STEP 5: "Let entry be the entry one earlier than entry in the list
            //          of active formatting elements."
            entry_index -= 1;

            // STEP 6: "If entry is neither a marker nor an element that is also
            //          in the stack of open elements, go to the step labeled rewind."
            let stop = match &self.active_formatting_elements[entry_index] {
                ActiveFormattingElement::Marker => true,
                ActiveFormattingElement::Element { node_id, .. } => {
                    self.stack_of_open_elements.contains(node_id)
                }
            };
            if stop {
                // STEP 7: "Advance: Let entry be the element one later than entry in
                // the list of active formatting elements."
                entry_index += 1;
                break;
            }
        }

        // STEP 8-10: Create phase
        while entry_index < self.active_formatting_elements.len() {
            // STEP 8: "Create: Insert an HTML element for the token for which
            //          the element entry was created, to obtain new element."
            let token = match &self.active_formatting_elements[entry_index] {
                ActiveFormattingElement::Element { token, .. } => token.clone(),
                ActiveFormattingElement::Marker => {
                    entry_index += 1;
                    continue;
                }
            };
            let new_element = self.insert_html_element(&token);

            // STEP 9: "Replace the entry for entry in the list with an entry
            //          for new element."
            self.active_formatting_elements[entry_index] = ActiveFormattingElement::Element {
                node_id: new_element,
                token,
            };

            // STEP 10: "If the entry for new element in the list of active
            //           formatting elements is not the last entry in the list,
            //           return to the step labeled advance."
            entry_index += 1;
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// 1. "Let entry be the last (most recently added) entry in the list."
    /// 2. "Remove entry from the list."
    /// 3. "If entry was a marker, stop. Otherwise, go to step 1."
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, ActiveFormattingElement::Marker) {
                break;
            }
        }
    }
}

// =============================================================================
// Resetting the Insertion Mode
// =============================================================================

impl HTMLParser<'_> {
    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    ///
    /// "When the steps below require the UA to reset the insertion mode
    /// appropriately, the UA must follow these steps:"
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        self.insertion_mode = self.appropriate_insertion_mode();
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for (index, &stack_node) in self.stack_of_open_elements.iter().enumerate().rev() {
            // STEP 3: "Loop: If node is the first node in the stack of open elements,
            // then set last to true, and, if the parser was created as part of the
            // HTML fragment parsing algorithm (fragment case), set node to the
            // context element passed to that algorithm."
            let last = index == 0;
            let node = match self.context_element {
                Some(context) if last => context,
                _ => stack_node,
            };

            let Some(element) = self.element(node) else {
                continue;
            };
            let name = if element.namespace == Namespace::Html {
                element.tag_name.as_str()
            } else {
                ""
            };

            match name {
                // STEP 4: "If node is a select element, run these substeps:"
                "select" => {
                    // "If last is true, jump to the step below labeled done."
                    if !last {
                        // "Let ancestor be node."
                        // "Loop: If ancestor is the first node in the stack of open
                        // elements, jump to the step below labeled done."
                        // "Let ancestor be the node before ancestor in the stack of
                        // open elements."
                        for &ancestor in self.stack_of_open_elements[..index].iter().rev() {
                            // "If ancestor is a template node, jump to the step below
                            // labeled done."
                            if self.is_html_element(ancestor, "template") {
                                break;
                            }
                            // "If ancestor is a table node, switch the insertion mode to
                            // "in select in table" and return."
                            if self.is_html_element(ancestor, "table") {
                                return InsertionMode::InSelectInTable;
                            }
                        }
                    }
                    // "Done: Switch the insertion mode to "in select" and return."
                    return InsertionMode::InSelect;
                }
                // STEP 5: "If node is a td or th element and last is false, then
                // switch the insertion mode to "in cell" and return."
                "td" | "th" if !last => return InsertionMode::InCell,
                // STEP 6: "If node is a tr element, then switch the insertion mode to
                // "in row" and return."
                "tr" => return InsertionMode::InRow,
                // STEP 7: "If node is a tbody, thead, or tfoot element, then switch the
                // insertion mode to "in table body" and return."
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                // STEP 8: "If node is a caption element, then switch the insertion mode
                // to "in caption" and return."
                "caption" => return InsertionMode::InCaption,
                // STEP 9: "If node is a colgroup element, then switch the insertion mode
                // to "in column group" and return."
                "colgroup" => return InsertionMode::InColumnGroup,
                // STEP 10: "If node is a table element, then switch the insertion mode
                // to "in table" and return."
                "table" => return InsertionMode::InTable,
                // STEP 11: "If node is a template element, then switch the insertion
                // mode to the current template insertion mode and return."
                "template" => {
                    return self
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                // STEP 12: "If node is a head element and last is false, then switch
                // the insertion mode to "in head" and return."
                "head" if !last => return InsertionMode::InHead,
                // STEP 13: "If node is a body element, then switch the insertion mode
                // to "in body" and return."
                "body" => return InsertionMode::InBody,
                // STEP 14: "If node is a frameset element, then switch the insertion
                // mode to "in frameset" and return. (fragment case)"
                "frameset" => return InsertionMode::InFrameset,
                // STEP 15: "If node is an html element, run these substeps:"
                // "If the head element pointer is null, switch the insertion mode to
                // "before head" and return. (fragment case)"
                // "Otherwise, the head element pointer is not null, switch the
                // insertion mode to "after head" and return."
                "html" => {
                    return if self.head_element_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {}
            }

            // STEP 16: "If last is true, then switch the insertion mode to "in body"
            // and return. (fragment case)"
            if last {
                return InsertionMode::InBody;
            }
            // STEP 17: "Let node now be the node before node in the stack of open
            // elements." STEP 18: "Return to the step labeled loop."
        }
        InsertionMode::InBody
    }
}
