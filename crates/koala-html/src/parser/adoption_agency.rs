//! The adoption agency algorithm.
//!
//! [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs mis-nested formatting elements such as `<b>1<i>2</b>3</i>`, which
//! becomes `<b>1<i>2</i></b><i>3</i>`.

use koala_dom::{Namespace, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser};
use super::helpers::{Scope, is_special_element};
use crate::error::ParseErrorKind;

/// "If outerLoopCounter is greater than or equal to 8, then return."
const OUTER_LOOP_LIMIT: usize = 8;

/// "If innerLoopCounter is greater than 3 and node is in the list of active
/// formatting elements, then remove node from the list of active formatting
/// elements."
const INNER_LOOP_LIMIT: usize = 3;

impl HTMLParser<'_> {
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// "The adoption agency algorithm, which takes as its only argument a token
    /// token for which the algorithm is being run, consists of the following
    /// steps:"
    pub(super) fn run_adoption_agency(&mut self, subject: &str) {
        // STEP 2: "If the current node is an HTML element whose tag name is subject,
        // and the current node is not in the list of active formatting elements,
        // then pop the current node off the stack of open elements and return."
        if let Some(current) = self.current_node()
            && self.is_html_element(current, subject)
            && self.active_formatting_position(current).is_none()
        {
            self.pop_current_node();
            return;
        }

        // STEP 3: "Let outerLoopCounter be 0."
        let mut outer_loop_counter = 0;

        // STEP 4: "While true:"
        loop {
            // STEP 4.1: "If outerLoopCounter is greater than or equal to 8, then return."
            if outer_loop_counter >= OUTER_LOOP_LIMIT {
                self.parse_error(ParseErrorKind::AdoptionAgencyBound);
                return;
            }

            // STEP 4.2: "Increment outerLoopCounter by 1."
            outer_loop_counter += 1;

            // STEP 4.3: "Let formattingElement be the last element in the list of active
            // formatting elements that: is between the end of the list and the last marker
            // in the list, if any, or the start of the list otherwise, and has the tag name
            // subject."
            // "If there is no such element, then return and instead act as described in the
            // "any other end tag" entry above."
            let Some((formatting_afe_index, formatting_element)) =
                self.last_formatting_element_named(subject)
            else {
                self.any_other_end_tag(subject);
                return;
            };

            // STEP 4.4: "If formattingElement is not in the stack of open elements, then this
            // is a parse error; remove the element from the list, and return."
            let Some(formatting_stack_index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == formatting_element)
            else {
                self.parse_error(ParseErrorKind::UnexpectedEndTag);
                let _ = self
                    .active_formatting_elements
                    .remove(formatting_afe_index);
                return;
            };

            // STEP 4.5: "If formattingElement is in the stack of open elements, but the
            // element is not in scope, then this is a parse error; return."
            if !self.has_node_in_scope(formatting_element, Scope::Default) {
                self.parse_error(ParseErrorKind::UnexpectedEndTag);
                return;
            }

            // STEP 4.6: "If formattingElement is not the current node, this is a parse
            // error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error(ParseErrorKind::MisnestedEndTag);
            }

            // STEP 4.7: "Let furthestBlock be the topmost node in the stack of open elements
            // that is lower in the stack than formattingElement, and is an element in the
            // special category. There might not be one."
            let furthest_block_index = (formatting_stack_index + 1
                ..self.stack_of_open_elements.len())
                .find(|&i| {
                    self.element(self.stack_of_open_elements[i])
                        .is_some_and(is_special_element)
                });

            // STEP 4.8: "If there is no furthestBlock, then the UA must first pop all the
            // nodes from the bottom of the stack of open elements, from the current node up
            // to and including formattingElement, then remove formattingElement from the
            // list of active formatting elements, and finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.stack_of_open_elements.truncate(formatting_stack_index);
                let _ = self
                    .active_formatting_elements
                    .remove(formatting_afe_index);
                return;
            };
            let furthest_block = self.stack_of_open_elements[furthest_block_index];

            // STEP 4.9: "Let commonAncestor be the element immediately above
            // formattingElement in the stack of open elements."
            let common_ancestor = formatting_stack_index
                .checked_sub(1)
                .map_or(NodeId::ROOT, |i| self.stack_of_open_elements[i]);

            // STEP 4.10: "Let a bookmark note the position of formattingElement in the list
            // of active formatting elements relative to the elements on either side of it in
            // the list."
            let mut bookmark = formatting_afe_index;

            // STEP 4.11: "Let node and lastNode be furthestBlock."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.12: "Let innerLoopCounter be 0."
            let mut inner_loop_counter = 0;

            // STEP 4.13: "While true:"
            loop {
                // STEP 4.13.1: "Increment innerLoopCounter by 1."
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node in the stack
                // of open elements, or if node is no longer in the stack of open elements
                // (e.g. because it got removed by this algorithm), the element that was
                // immediately above node in the stack of open elements before node was
                // removed."
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 4.13.3: "If node is formattingElement, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If innerLoopCounter is greater than 3 and node is in the list
                // of active formatting elements, then remove node from the list of active
                // formatting elements."
                let mut node_afe_index = self.active_formatting_position(node);
                if inner_loop_counter > INNER_LOOP_LIMIT
                    && let Some(index) = node_afe_index.take()
                {
                    let _ = self.active_formatting_elements.remove(index);
                    if index < bookmark {
                        bookmark -= 1;
                    }
                }

                // STEP 4.13.5: "If node is not in the list of active formatting elements, then
                // remove node from the stack of open elements and continue."
                let Some(node_afe_index) = node_afe_index else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the element node was
                // created, in the HTML namespace, with commonAncestor as the intended parent;
                // replace the entry for node in the list of active formatting elements with an
                // entry for the new element, replace the entry for node in the stack of open
                // elements with an entry for the new element, and let node be the new element."
                let ActiveFormattingElement::Element { token, .. } =
                    &self.active_formatting_elements[node_afe_index]
                else {
                    break;
                };
                let token = token.clone();
                let new_element = self.create_element_for_token(&token, Namespace::Html);
                self.active_formatting_elements[node_afe_index] = ActiveFormattingElement::Element {
                    node_id: new_element,
                    token,
                };
                self.stack_of_open_elements[node_index] = new_element;

                // STEP 4.13.7: "If lastNode is furthestBlock, then move the aforementioned
                // bookmark to be immediately after the new node in the list of active
                // formatting elements."
                if last_node == furthest_block {
                    bookmark = node_afe_index + 1;
                }

                // STEP 4.13.8: "Append lastNode to node."
                self.document.append_child(new_element, last_node);

                // STEP 4.13.9: "Set lastNode to node."
                last_node = new_element;
            }

            // STEP 4.14: "Insert whatever lastNode ended up being in the appropriate place
            // for inserting a node, but using commonAncestor as the override target."
            let location = self.appropriate_place_for_inserting(Some(common_ancestor));
            self.insert_at(location, last_node);

            // STEP 4.15: "Create an element for the token for which formattingElement was
            // created, in the HTML namespace, with furthestBlock as the intended parent."
            let Some(formatting_afe_index) = self.active_formatting_position(formatting_element)
            else {
                return;
            };
            let ActiveFormattingElement::Element { token, .. } =
                &self.active_formatting_elements[formatting_afe_index]
            else {
                return;
            };
            let token = token.clone();
            let new_element = self.create_element_for_token(&token, Namespace::Html);

            // STEP 4.16: "Take all of the child nodes of furthestBlock and append them to the
            // element created in the last step."
            self.document.move_children(furthest_block, new_element);

            // STEP 4.17: "Append that new element to furthestBlock."
            self.document.append_child(furthest_block, new_element);

            // STEP 4.18: "Remove formattingElement from the list of active formatting
            // elements, and insert the new element into the list of active formatting
            // elements at the position of the aforementioned bookmark."
            let _ = self
                .active_formatting_elements
                .remove(formatting_afe_index);
            if formatting_afe_index < bookmark {
                bookmark -= 1;
            }
            let bookmark = bookmark.min(self.active_formatting_elements.len());
            self.active_formatting_elements.insert(
                bookmark,
                ActiveFormattingElement::Element {
                    node_id: new_element,
                    token,
                },
            );

            // STEP 4.19: "Remove formattingElement from the stack of open elements, and
            // insert the new element into the stack of open elements immediately below the
            // position of furthestBlock in that stack."
            self.remove_from_stack(formatting_element);
            if let Some(index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
            {
                self.stack_of_open_elements.insert(index + 1, new_element);
            }
        }
    }

    /// The last element named `subject` in the list of active formatting
    /// elements after the last marker, with its index in the list.
    fn last_formatting_element_named(&self, subject: &str) -> Option<(usize, NodeId)> {
        for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                ActiveFormattingElement::Marker => return None,
                ActiveFormattingElement::Element { node_id, .. } => {
                    if self.is_html_element(*node_id, subject) {
                        return Some((index, *node_id));
                    }
                }
            }
        }
        None
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node of
        // the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];

            // STEP 2: "Loop: If node is an HTML element with the same tag name as the
            // token, then:"
            if self.is_html_element(node, name) {
                // STEP 2.1: "Generate implied end tags, except for HTML elements with the
                // same tag name as the token."
                self.generate_implied_end_tags(Some(name));
                // STEP 2.2: "If node is not the current node, then this is a parse error."
                if self.current_node() != Some(node) {
                    self.parse_error(ParseErrorKind::MisnestedEndTag);
                }
                // STEP 2.3: "Pop all the nodes from the current node up to node, including
                // node, then stop these steps."
                self.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then this is a
            // parse error; ignore the token, and return."
            if self.element(node).is_some_and(is_special_element) {
                self.parse_error(ParseErrorKind::UnexpectedEndTag);
                return;
            }

            // STEP 4: "Set node to the previous entry in the stack of open elements."
            // STEP 5: "Return to the step labeled loop."
        }
    }
}
