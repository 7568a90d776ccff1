use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tessel_dom::Document;
use tessel_template::{
    AttributePart, BindingKind, PLACEHOLDER_MARKER, TemplateInstance, TemplateNode, Value,
    ValueFragment,
};
use tracing::debug;

/// Read a template file and split it into static parts on `{}`.
pub fn read_parts(input: &Path) -> Result<Vec<String>> {
    let src =
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let parts: Vec<String> = src.split(PLACEHOLDER_MARKER).map(str::to_string).collect();
    debug!(file = %input.display(), placeholders = parts.len() - 1, "read template");
    Ok(parts)
}

/// Parse a `--value` argument: `undefined`, `null`, booleans and numbers are
/// recognized, anything else is a string.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "undefined" => Value::Undefined,
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<f64>()
            .map_or_else(|_| Value::from(raw), Value::Number),
    }
}

/// One token per line: `KIND value`.
pub fn tokens_cmd(input: &Path) -> Result<String> {
    let parts = read_parts(input)?;
    let tokens = tessel_template::tokenize(&parts)
        .with_context(|| format!("failed to tokenize {}", input.display()))?;
    let mut out = String::new();
    for token in tokens {
        if token.value.is_empty() {
            writeln!(out, "{}", token.kind.name())?;
        } else {
            writeln!(out, "{} {:?}", token.kind.name(), token.value)?;
        }
    }
    Ok(out)
}

/// Indented node tree.
pub fn tree_cmd(input: &Path) -> Result<String> {
    let parts = read_parts(input)?;
    let tokens = tessel_template::tokenize(&parts)
        .with_context(|| format!("failed to tokenize {}", input.display()))?;
    let nodes = tessel_template::parse(&tokens)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut out = String::new();
    write_nodes(&mut out, &nodes, 0)?;
    Ok(out)
}

fn write_nodes(out: &mut String, nodes: &[TemplateNode], depth: usize) -> std::fmt::Result {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            TemplateNode::Text(text) => writeln!(out, "{indent}text {text:?}")?,
            TemplateNode::Comment(text) => writeln!(out, "{indent}comment {text:?}")?,
            TemplateNode::Placeholder => writeln!(out, "{indent}placeholder")?,
            TemplateNode::Element(element) => {
                write!(out, "{indent}<{}>", element.name)?;
                for attribute in &element.attributes {
                    let value: String = attribute
                        .value
                        .iter()
                        .map(|fragment| match fragment {
                            ValueFragment::Literal(text) => text.as_str(),
                            ValueFragment::Placeholder => PLACEHOLDER_MARKER,
                        })
                        .collect();
                    write!(out, " {}={value:?}", attribute.name)?;
                }
                writeln!(out)?;
                write_nodes(out, &element.children, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// Binding tables of the compiled template.
pub fn bindings_cmd(input: &Path) -> Result<String> {
    let parts = read_parts(input)?;
    let template = tessel_template::compile(&parts)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    let mut out = String::new();
    writeln!(out, "placeholders: {}", template.placeholder_count())?;
    for property in template.node_properties() {
        writeln!(
            out,
            "property {:?} .{} = {:?}",
            property.path, property.name, property.value
        )?;
    }
    for attribute in template.dynamic_attributes() {
        let kind = match attribute.kind {
            BindingKind::Attribute => "attribute",
            BindingKind::Property => "property",
        };
        let parts: Vec<String> = attribute
            .parts
            .iter()
            .map(|part| match part {
                AttributePart::Literal(text) => format!("{text:?}"),
                AttributePart::Placeholder(index) => format!("${index}"),
            })
            .collect();
        writeln!(
            out,
            "{kind} {:?} {} = {}",
            attribute.path,
            attribute.name,
            parts.join(" + ")
        )?;
    }
    for fragment in template.dynamic_fragments() {
        writeln!(out, "content {:?} = ${}", fragment.path, fragment.placeholder)?;
    }
    Ok(out)
}

/// Instantiate the template into an empty document and serialize it.
pub fn render_cmd(input: &Path, values: &[String]) -> Result<String> {
    let parts = read_parts(input)?;
    let template = tessel_template::compile(&parts)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    let values: Vec<Value> = values.iter().map(|raw| parse_value(raw)).collect();

    let mut doc = Document::new();
    let mut instance = TemplateInstance::new(Rc::clone(&template), &mut doc)
        .context("failed to instantiate template")?;
    instance
        .set_placeholder_values(&mut doc, &values)
        .context("failed to apply values")?;
    debug!(stats = ?doc.stats(), "rendered");
    Ok(doc.inner_html(instance.fragment()))
}
