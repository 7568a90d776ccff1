use pest::Parser;
use pest::iterators::Pair;

use crate::ast::{Token, TokenKind};
use crate::error::ParseError;

#[derive(pest_derive::Parser)]
#[grammar = "grammar.pest"]
struct TemplateGrammar;

/// Matchers tried outside of a tag. The longest match wins; ties go to the
/// earlier entry.
const OUTSIDE_TAG: [Rule; 4] = [
    Rule::comment,
    Rule::element_end,
    Rule::element_start,
    Rule::text,
];

fn prefix(rule: Rule, input: &str) -> Option<Pair<'_, Rule>> {
    TemplateGrammar::parse(rule, input).ok()?.next()
}

fn prefix_len(rule: Rule, input: &str) -> Option<usize> {
    prefix(rule, input).map(|pair| pair.as_str().len())
}

fn inner_str<'i>(pair: Pair<'i, Rule>) -> &'i str {
    pair.into_inner().next().map_or("", |inner| inner.as_str())
}

/// Scan the static segments of a template into a flat token stream.
///
/// Every boundary between two segments yields exactly one
/// [`TokenKind::Placeholder`] token, so `segments.len() - 1` placeholders are
/// produced in total.
pub fn tokenize<S: AsRef<str>>(segments: &[S]) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(segments).run()
}

struct Tokenizer<'a, S> {
    segments: &'a [S],
    segment: usize,
    offset: usize,
    tokens: Vec<Token>,
    in_tag: bool,
    delimiter: Option<char>,
    open_element: String,
}

impl<'a, S: AsRef<str>> Tokenizer<'a, S> {
    fn new(segments: &'a [S]) -> Self {
        Self {
            segments,
            segment: 0,
            offset: 0,
            tokens: Vec::new(),
            in_tag: false,
            delimiter: None,
            open_element: String::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let segments = self.segments;
        while self.segment < segments.len() {
            let current = segments[self.segment].as_ref();
            if self.offset >= current.len() {
                if self.segment + 1 < segments.len() {
                    self.tokens.push(Token::placeholder());
                }
                self.segment += 1;
                self.offset = 0;
                continue;
            }

            let rest = &current[self.offset..];
            if let Some(delimiter) = self.delimiter {
                self.quoted_continuation(rest, delimiter);
            } else if self.in_tag {
                self.inside_tag(rest)?;
            } else {
                self.outside_tag(rest)?;
            }
        }
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>) {
        self.tokens.push(Token::new(kind, value));
    }

    fn syntax_error(&self) -> ParseError {
        ParseError::Syntax {
            segment: self.segment,
            offset: self.offset,
        }
    }

    // A quoted attribute value interrupted by a placeholder.
    fn quoted_continuation(&mut self, rest: &str, delimiter: char) {
        match rest.find(delimiter) {
            Some(end) => {
                if end > 0 {
                    self.push(TokenKind::AttributeValue, &rest[..end]);
                }
                self.offset += end + delimiter.len_utf8();
                self.delimiter = None;
            }
            None => {
                self.push(TokenKind::AttributeValue, rest);
                self.offset += rest.len();
            }
        }
    }

    fn inside_tag(&mut self, rest: &str) -> Result<(), ParseError> {
        if let Some(len) = prefix_len(Rule::blank, rest) {
            self.offset += len;
            return Ok(());
        }

        if let Some(close) = prefix(Rule::tag_close, rest) {
            let kind = if close.as_str() == "/>" {
                TokenKind::ElementEnd
            } else {
                TokenKind::ElementStartClose
            };
            let name = self.open_element.clone();
            self.push(kind, name);
            self.offset += close.as_str().len();
            self.in_tag = false;
            return Ok(());
        }

        let Some(name_len) = prefix_len(Rule::attribute_name, rest) else {
            return Err(self.syntax_error());
        };
        self.push(TokenKind::AttributeName, &rest[..name_len]);
        self.offset += name_len;

        let after_name = &rest[name_len..];
        match prefix_len(Rule::assign, after_name) {
            Some(assign_len) => {
                self.offset += assign_len;
                self.attribute_value(&after_name[assign_len..])
            }
            // boolean attribute
            None => Ok(()),
        }
    }

    fn attribute_value(&mut self, rest: &str) -> Result<(), ParseError> {
        if rest.is_empty() {
            // the upcoming placeholder supplies the value
            return Ok(());
        }

        if let Some(quoted) = prefix(Rule::quoted_value, rest) {
            let len = quoted.as_str().len();
            self.push(TokenKind::AttributeValue, inner_str(quoted));
            self.offset += len;
            return Ok(());
        }

        if let Some(len) = prefix_len(Rule::unquoted_value, rest) {
            self.push(TokenKind::AttributeValue, &rest[..len]);
            self.offset += len;
            return Ok(());
        }

        let mut chars = rest.chars();
        match chars.next() {
            Some(quote @ ('"' | '\'')) => {
                let value = chars.as_str();
                self.delimiter = Some(quote);
                self.offset += quote.len_utf8();
                if !value.is_empty() {
                    self.push(TokenKind::AttributeValue, value);
                }
                self.offset += value.len();
                Ok(())
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn outside_tag(&mut self, rest: &str) -> Result<(), ParseError> {
        let mut best: Option<(Rule, Pair<'_, Rule>)> = None;
        for rule in OUTSIDE_TAG {
            let Some(pair) = prefix(rule, rest) else {
                continue;
            };
            let longer = best
                .as_ref()
                .is_none_or(|(_, current)| pair.as_str().len() > current.as_str().len());
            if longer {
                best = Some((rule, pair));
            }
        }
        let Some((rule, pair)) = best else {
            return Err(self.syntax_error());
        };

        let len = pair.as_str().len();
        match rule {
            Rule::text => {
                self.push(TokenKind::Text, pair.as_str());
                self.offset += len;
            }
            Rule::comment => {
                self.push(TokenKind::Comment, inner_str(pair));
                self.offset += len;
            }
            Rule::element_end => {
                self.push(TokenKind::ElementEnd, inner_str(pair).trim());
                self.offset += len;
            }
            _ => {
                self.offset += len;
                let mut name_input = &rest[len..];
                if let Some(blank) = prefix_len(Rule::blank, name_input) {
                    self.offset += blank;
                    name_input = &name_input[blank..];
                }
                let Some(name_len) = prefix_len(Rule::element_name, name_input) else {
                    return Err(ParseError::MissingElementName {
                        segment: self.segment,
                        offset: self.offset,
                    });
                };
                let name = &name_input[..name_len];
                self.open_element = name.to_string();
                self.push(TokenKind::ElementStartOpen, name);
                self.offset += name_len;
                self.in_tag = true;
            }
        }
        Ok(())
    }
}
