//! Common utilities for the Koala HTML parser.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Warning System** - colored, deduplicated terminal diagnostics
//! - **Source Loading** - reading documents from disk or bytes as text

pub mod source;
pub mod warning;
