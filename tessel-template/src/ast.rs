#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Comment,
    ElementStartOpen,
    ElementStartClose,
    ElementEnd,
    AttributeName,
    AttributeValue,
    Placeholder,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Text => "TEXT",
            TokenKind::Comment => "COMMENT",
            TokenKind::ElementStartOpen => "ELEMENT_START_OPEN",
            TokenKind::ElementStartClose => "ELEMENT_START_CLOSE",
            TokenKind::ElementEnd => "ELEMENT_END",
            TokenKind::AttributeName => "ATTRIBUTE_NAME",
            TokenKind::AttributeValue => "ATTRIBUTE_VALUE",
            TokenKind::Placeholder => "PLACEHOLDER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(TokenKind::Placeholder, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueFragment {
    Literal(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Vec<ValueFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Text(String),
    Comment(String),
    Element(Element),
    Placeholder,
}
