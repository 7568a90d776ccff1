use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::ParseError;
use crate::template::Template;
use crate::value::{TemplateResult, Value};

/// Marker splitting a source string into static parts for [`html`].
pub const PLACEHOLDER_MARKER: &str = "{}";

/// Compiled templates keyed by their static parts.
///
/// Unbounded: the number of distinct keys is bounded by the templates written
/// in source, not by runtime data.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<Vec<String>, Rc<Template>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached template for `parts`, compiling it on first use.
    ///
    /// A failed compile is not cached.
    pub fn compile<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<Rc<Template>, ParseError> {
        let key: Vec<String> = parts.iter().map(|p| p.as_ref().to_string()).collect();
        if let Some(template) = self.entries.get(&key) {
            trace!(parts = key.len(), "template cache hit");
            return Ok(Rc::clone(template));
        }
        let template = Rc::new(crate::compile_template(&key)?);
        debug!(
            placeholders = template.placeholder_count(),
            cached = self.entries.len() + 1,
            "compiled template"
        );
        self.entries.insert(key, Rc::clone(&template));
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

thread_local! {
    static TEMPLATE_CACHE: RefCell<TemplateCache> = RefCell::new(TemplateCache::new());
}

/// Compile through the thread's template cache.
pub fn compile<S: AsRef<str>>(parts: &[S]) -> Result<Rc<Template>, ParseError> {
    TEMPLATE_CACHE.with(|cache| cache.borrow_mut().compile(parts))
}

/// Tagged-template call: static parts plus the values for this render.
pub fn tpl<S: AsRef<str>>(parts: &[S], values: Vec<Value>) -> Result<Value, ParseError> {
    let template = compile(parts)?;
    Ok(Value::Template(TemplateResult::new(template, values)))
}

/// Like [`tpl`], with placeholders written as `{}` inside one source string.
pub fn html(source: &str, values: Vec<Value>) -> Result<Value, ParseError> {
    let parts: Vec<&str> = source.split(PLACEHOLDER_MARKER).collect();
    tpl(&parts, values)
}

/// Number of templates compiled on this thread so far.
pub fn cached_template_count() -> usize {
    TEMPLATE_CACHE.with(|cache| cache.borrow().len())
}

/// `html!("<p>{}</p>", name)` builds a template result, converting each
/// value with `Value::from`.
#[macro_export]
macro_rules! html {
    ($source:expr $(, $value:expr)* $(,)?) => {
        $crate::html($source, vec![$($crate::Value::from($value)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_parts_share_one_template() {
        let mut cache = TemplateCache::new();
        let a = cache.compile(&["<p>", "</p>"]).unwrap();
        let b = cache.compile(&["<p>".to_string(), "</p>".to_string()]).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn placeholder_count_is_part_of_the_key() {
        let mut cache = TemplateCache::new();
        let one = cache.compile(&["<p>", "</p>"]).unwrap();
        let joined = cache.compile(&["<p></p>"]).unwrap();
        assert!(!Rc::ptr_eq(&one, &joined));
        assert_eq!(one.placeholder_count(), 1);
        assert_eq!(joined.placeholder_count(), 0);
    }

    #[test]
    fn thread_cache_compiles_each_source_once() {
        let before = cached_template_count();
        let first = html("<p>{}</p>", vec![1.into()]).unwrap();
        let second = crate::html!("<p>{}</p>", 2).unwrap();
        assert_eq!(cached_template_count(), before + 1);
        match (first, second) {
            (Value::Template(a), Value::Template(b)) => {
                assert!(Rc::ptr_eq(a.template(), b.template()));
                assert_ne!(a.values(), b.values());
            }
            other => panic!("expected template results, got {other:?}"),
        }
    }

    #[test]
    fn failed_compiles_are_not_cached() {
        let mut cache = TemplateCache::new();
        assert!(cache.compile(&["<div>"]).is_err());
        assert!(cache.is_empty());
    }
}
