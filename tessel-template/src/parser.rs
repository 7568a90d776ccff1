use tessel_dom::is_void_element;

use crate::ast::{Attribute, Element, TemplateNode, Token, TokenKind, ValueFragment};
use crate::error::ParseError;

/// Build the template node tree from a token stream.
///
/// A placeholder belongs to an attribute value when the nearest preceding
/// ATTRIBUTE_NAME / ELEMENT_START_CLOSE / ELEMENT_END token is an
/// ATTRIBUTE_NAME. That is tracked with a flag during this single forward
/// pass instead of scanning backwards from every placeholder.
pub fn parse(tokens: &[Token]) -> Result<Vec<TemplateNode>, ParseError> {
    let mut roots: Vec<TemplateNode> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    // element between ELEMENT_START_OPEN and ELEMENT_START_CLOSE
    let mut open: Option<Element> = None;
    let mut setting_attribute = false;

    fn push_child(stack: &mut [Element], roots: &mut Vec<TemplateNode>, node: TemplateNode) {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        } else {
            roots.push(node);
        }
    }

    fn last_attribute<'e>(
        open: &'e mut Option<Element>,
        token: TokenKind,
    ) -> Result<&'e mut Attribute, ParseError> {
        open.as_mut()
            .and_then(|element| element.attributes.last_mut())
            .ok_or(ParseError::UnexpectedToken {
                token: token.name(),
            })
    }

    for token in tokens {
        match token.kind {
            TokenKind::Text | TokenKind::Comment if open.is_some() => {
                return Err(ParseError::UnexpectedToken {
                    token: token.kind.name(),
                });
            }
            TokenKind::Text => {
                push_child(&mut stack, &mut roots, TemplateNode::Text(token.value.clone()));
            }
            TokenKind::Comment => {
                push_child(
                    &mut stack,
                    &mut roots,
                    TemplateNode::Comment(token.value.clone()),
                );
            }
            TokenKind::ElementStartOpen => {
                if let Some(element) = &open {
                    return Err(ParseError::UnclosedTag {
                        name: element.name.clone(),
                    });
                }
                open = Some(Element {
                    name: token.value.clone(),
                    attributes: Vec::new(),
                    children: Vec::new(),
                });
                setting_attribute = false;
            }
            TokenKind::ElementStartClose => {
                setting_attribute = false;
                let element = open.take().ok_or(ParseError::UnexpectedToken {
                    token: token.kind.name(),
                })?;
                if is_void_element(&element.name) {
                    push_child(&mut stack, &mut roots, TemplateNode::Element(element));
                } else {
                    stack.push(element);
                }
            }
            TokenKind::ElementEnd => {
                setting_attribute = false;
                // self-closing tag
                if let Some(element) = open.take() {
                    push_child(&mut stack, &mut roots, TemplateNode::Element(element));
                    continue;
                }
                let closes_top = stack.last().is_some_and(|top| top.name == token.value);
                if !closes_top && is_void_element(&token.value) {
                    // `</br>` and friends close nothing
                    continue;
                }
                let Some(element) = stack.pop() else {
                    return Err(ParseError::UnexpectedClose {
                        name: token.value.clone(),
                    });
                };
                if !closes_top {
                    return Err(ParseError::MismatchedClose {
                        found: token.value.clone(),
                        open: element.name,
                    });
                }
                push_child(&mut stack, &mut roots, TemplateNode::Element(element));
            }
            TokenKind::AttributeName => {
                let element = open.as_mut().ok_or(ParseError::UnexpectedToken {
                    token: token.kind.name(),
                })?;
                element.attributes.push(Attribute {
                    name: token.value.clone(),
                    value: Vec::new(),
                });
                setting_attribute = true;
            }
            TokenKind::AttributeValue => {
                last_attribute(&mut open, token.kind)?
                    .value
                    .push(ValueFragment::Literal(token.value.clone()));
            }
            TokenKind::Placeholder if setting_attribute => {
                last_attribute(&mut open, token.kind)?
                    .value
                    .push(ValueFragment::Placeholder);
            }
            TokenKind::Placeholder => {
                if let Some(element) = &open {
                    return Err(ParseError::StrayPlaceholder {
                        element: element.name.clone(),
                    });
                }
                push_child(&mut stack, &mut roots, TemplateNode::Placeholder);
            }
        }
    }

    if let Some(element) = open {
        return Err(ParseError::UnclosedTag { name: element.name });
    }
    if let Some(element) = stack.pop() {
        return Err(ParseError::UnclosedElement { name: element.name });
    }
    Ok(roots)
}
