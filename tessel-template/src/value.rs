use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tessel_dom::{NodeId, PropValue};

use crate::instance::TemplateInstance;
use crate::template::Template;

/// A template instance that can be inserted by reference.
pub type SharedInstance = Rc<RefCell<TemplateInstance>>;

/// The output of a template call: the compiled template plus the values for
/// this render.
#[derive(Debug, Clone)]
pub struct TemplateResult {
    template: Rc<Template>,
    values: Vec<Value>,
}

impl TemplateResult {
    pub fn new(template: Rc<Template>, values: Vec<Value>) -> Self {
        Self { template, values }
    }

    pub fn template(&self) -> &Rc<Template> {
        &self.template
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for TemplateResult {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.template, &other.template) && self.values == other.values
    }
}

/// A placeholder value supplied at render time.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Node(NodeId),
    List(Vec<Value>),
    Template(TemplateResult),
    Instance(SharedInstance),
}

impl Value {
    /// `undefined`, `null` and `false` remove a single-placeholder attribute.
    pub fn is_removal_sentinel(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null | Value::Bool(false))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Values that render as a single text node.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_)
        )
    }

    pub fn to_text(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Node(_) | Value::Template(_) | Value::Instance(_) => String::new(),
        }
    }

    pub fn to_prop(&self) -> PropValue {
        match self {
            Value::Undefined => PropValue::Undefined,
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(*b),
            Value::Number(n) => PropValue::Number(*n),
            Value::Str(s) => PropValue::Str(s.clone()),
            Value::Node(node) => PropValue::Node(*node),
            Value::List(items) => PropValue::List(items.iter().map(Value::to_prop).collect()),
            Value::Template(_) | Value::Instance(_) => PropValue::Undefined,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // exponent form, always signed: 1e+21, 1.5e-7
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Template(a), Value::Template(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}
impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}
impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}
impl From<NodeId> for Value {
    fn from(node: NodeId) -> Self {
        Value::Node(node)
    }
}
impl From<TemplateResult> for Value {
    fn from(result: TemplateResult) -> Self {
        Value::Template(result)
    }
}
impl From<TemplateInstance> for Value {
    fn from(instance: TemplateInstance) -> Self {
        Value::Instance(Rc::new(RefCell::new(instance)))
    }
}
impl From<SharedInstance> for Value {
    fn from(instance: SharedInstance) -> Self {
        Value::Instance(instance)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
