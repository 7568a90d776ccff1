//! Host tree boundary: the minimal DOM subset the template patcher writes to,
//! plus an in-memory [`Document`] that implements it.

pub mod document;
pub mod host;

pub use document::{Document, MutationStats, NodeKind};
pub use host::{HostTree, NodeId, NodePath, PropValue};

/// Elements that never take children and serialize without a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements_are_case_insensitive() {
        assert!(is_void_element("br"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
    }
}
