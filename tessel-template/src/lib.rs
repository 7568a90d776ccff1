//! Template compiler and patcher.
//!
//! Static string parts go through [`tokenize`] → [`parse`] → [`compile_nodes`]
//! into a [`Template`]; a [`TemplateInstance`] clones it into a host tree and
//! patches placeholder values into the resolved binding sites.

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod instance;
pub mod parser;
pub mod template;
pub mod tokenizer;
pub mod value;

pub use ast::{Attribute, Element, TemplateNode, Token, TokenKind, ValueFragment};
pub use cache::{PLACEHOLDER_MARKER, TemplateCache, cached_template_count, compile, html, tpl};
pub use compiler::{PROPERTY_PREFIX, compile_nodes};
pub use error::{ParseError, PatchError};
pub use instance::{TemplateInstance, materialize};
pub use parser::parse;
pub use template::{
    AttributePart, BindingKind, DynamicAttribute, DynamicFragment, NodeProperty, Template,
};
pub use tokenizer::tokenize;
pub use value::{SharedInstance, TemplateResult, Value};

/// Compile static parts without going through the cache.
pub fn compile_template<S: AsRef<str>>(parts: &[S]) -> Result<Template, ParseError> {
    let tokens = tokenize(parts)?;
    let nodes = parse(&tokens)?;
    Ok(compile_nodes(&nodes))
}
