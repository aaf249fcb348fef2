//! Utility functions for tree processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{Child, ElementNode, NodeId};

/// Separator for class lists, id tokens and `=~` attribute values
pub const TOKEN_DELIMITER: char = ' ';

/// True if `needle` occurs in `haystack` bounded on both sides by
/// `delimiter` or the edge of the string.
///
/// `"footer copyright small"` contains `"copyright"`, while
/// `"copyrighted"` does not.
pub fn token_match(haystack: &str, needle: &str, delimiter: char) -> bool {
    if needle.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();

        let left_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c == delimiter);
        let right_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| c == delimiter);

        if left_ok && right_ok {
            return true;
        }

        // Resume one character past this occurrence
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }

    false
}

/// True if the element's attribute `name` has a value containing `token`
pub fn attr_has_token(node: &ElementNode, name: &str, token: &str) -> bool {
    node.attr(name)
        .and_then(|a| a.value())
        .is_some_and(|value| token_match(value, token, TOKEN_DELIMITER))
}

/// Get all text content from an element and its descendants, in document
/// order
pub fn text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut out = String::new();
    let mut stack: Vec<&Child> = arena.children(node_id)?.iter().rev().collect();

    while let Some(child) = stack.pop() {
        match child {
            Child::Text(t) => out.push_str(t.as_str()),
            Child::Element(id) => stack.extend(arena.children(*id)?.iter().rev()),
        }
    }

    Ok(out)
}
