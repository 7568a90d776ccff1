use tessel_dom::NodePath;
use thiserror::Error;

/// Grammar errors raised while compiling a template. Fatal for that template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parsing failed in fragment #{segment}, position {offset}")]
    Syntax { segment: usize, offset: usize },

    #[error("missing element name in fragment #{segment}, position {offset}")]
    MissingElementName { segment: usize, offset: usize },

    #[error("encountered the end of the {name} element on the top level")]
    UnexpectedClose { name: String },

    #[error("encountered the end of the {found} element inside the {open} element")]
    MismatchedClose { found: String, open: String },

    #[error("the {name} element is never closed")]
    UnclosedElement { name: String },

    #[error("the <{name}> tag is never closed")]
    UnclosedTag { name: String },

    #[error("placeholder inside the <{element}> tag does not follow an attribute name")]
    StrayPlaceholder { element: String },

    #[error("unexpected {token} token")]
    UnexpectedToken { token: &'static str },
}

/// A binding site of a compiled template could not be found in its clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("no node at path {path:?} of the template fragment")]
    MissingNode { path: NodePath },

    #[error("content region at path {path:?} has no end marker")]
    MissingEndMarker { path: NodePath },

    #[error("content region marker at path {path:?} is detached")]
    DetachedMarker { path: NodePath },
}
