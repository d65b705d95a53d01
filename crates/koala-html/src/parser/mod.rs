//! HTML parser module for tree construction.

mod adoption_agency;
/// The parser state and the tree construction dispatcher.
pub mod core;
/// SVG and MathML content inside HTML documents.
pub mod foreign_content;
mod helpers;
mod in_body;
mod in_select;
mod in_table;
mod modes;
mod quirks;

pub use self::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
