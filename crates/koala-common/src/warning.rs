//! Parser diagnostics with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! The tokenizer and tree builder route parse errors through here when
//! diagnostics are switched on; by default nothing is printed.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record a warning and report whether it has not been seen before.
///
/// Never prints. `warn_once` is built on top of this.
pub fn first_occurrence(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Print a warning to stderr (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("HTML Parser", "unexpected-end-tag at offset 12");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_occurrence(component, message) {
        let line = format!("[Koala {component}] ⚠ {message}");
        eprintln!("{}", line.yellow());
    }
}

/// Clear all recorded warnings (call before parsing a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_deduplicates() {
        assert!(first_occurrence("Test Dedupe", "only once"));
        assert!(!first_occurrence("Test Dedupe", "only once"));
        assert!(first_occurrence("Test Dedupe", "something else"));
    }

    #[test]
    fn test_component_is_part_of_key() {
        assert!(first_occurrence("Component A", "shared message"));
        assert!(first_occurrence("Component B", "shared message"));
    }
}
