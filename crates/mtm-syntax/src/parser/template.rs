use super::Parser;
use crate::ast::{BindingType, DataBindingNode, ExpressionNode, TemplateNode, UpdateStrategy};
use crate::lexer::lex_at;
use crate::{SyntaxError, SyntaxResult};
use miette::SourceSpan;
use mtm_source::LineIndex;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<template(\s[^>]*)?>").expect("Invalid template tag regex pattern"));

const CLOSE_TAG: &str = "</template>";

/// `$name` and nothing else.
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$([A-Za-z_][A-Za-z0-9_]*)$").expect("Invalid variable regex pattern"));

static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex pattern"));

/// A quoted attribute: name, then the double or single quoted value.
static QUOTED_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z][A-Za-z0-9_:.\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Invalid attribute regex pattern")
});

static UNQUOTED_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z0-9_:.\-]*)\s*=\s*(\$[A-Za-z_][A-Za-z0-9_]*(\([^)\s>]*\))?)")
        .expect("Invalid handler regex pattern")
});

/// `$handler` or `$handler(args)` inside an attribute value.
static HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$([A-Za-z_][A-Za-z0-9_]*)\s*(?:\((.*)\))?$").expect("Invalid handler regex pattern")
});

/// Byte offsets of a `<template> ... </template>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TemplateBlock {
    /// Start of the opening tag
    pub start: usize,
    pub content_start: usize,
    pub content_end: usize,
    /// End of the closing tag
    pub end: usize,
}

/// Finds the template block in the body. The last closing tag ends the
/// block so nested `<template>` elements stay inside the markup.
pub(crate) fn locate(source: &str, body_start: usize, index: &LineIndex<'_>) -> SyntaxResult<Option<TemplateBlock>> {
    let Some(open) = OPEN_TAG.find_at(source, body_start) else {
        return Ok(None);
    };
    let Some(close) = source[open.end()..].rfind(CLOSE_TAG).map(|offset| open.end() + offset) else {
        return Err(SyntaxError::UnterminatedBlock {
            construct: "<template> block, expected '</template>'".to_string(),
            location: index.location(open.start()),
            span: SourceSpan::new(open.start().into(), open.len()),
        });
    };
    Ok(Some(TemplateBlock {
        start: open.start(),
        content_start: open.end(),
        content_end: close,
        end: close + CLOSE_TAG.len(),
    }))
}

pub(crate) fn parse_template(source: &str, block: &TemplateBlock, index: &LineIndex<'_>) -> SyntaxResult<TemplateNode> {
    let content = &source[block.content_start..block.content_end];
    let mut bindings = Vec::new();
    let mut expressions = Vec::new();

    collect_interpolations(source, block, index, &mut bindings, &mut expressions)?;
    collect_events(source, block, index, &mut bindings)?;
    bindings.sort_by_key(|binding| binding.location.index);

    log::trace!("Template has {} bindings", bindings.len());
    Ok(TemplateNode {
        content: content.to_string(),
        bindings,
        expressions,
        range: index.range(block.content_start, block.content_end),
    })
}

fn collect_interpolations(
    source: &str,
    block: &TemplateBlock,
    index: &LineIndex<'_>,
    bindings: &mut Vec<DataBindingNode>,
    expressions: &mut Vec<ExpressionNode>,
) -> SyntaxResult<()> {
    let mut cursor = block.content_start;
    while let Some(offset) = source[cursor..block.content_end].find("{{") {
        let open = cursor + offset;
        let inner_start = open + 2;
        let Some(close) = source[inner_start..block.content_end].find("}}").map(|offset| inner_start + offset) else {
            return Err(binding_error(index, open, 2, "unclosed '{{' interpolation, expected '}}'".to_string()));
        };
        let end = close + 2;
        let raw = &source[inner_start..close];
        let text = raw.trim();
        let text_start = inner_start + (raw.len() - raw.trim_start().len());
        let location = index.location(open);
        let range = index.range(open, end);

        if text.is_empty() {
            return Err(binding_error(index, open, end - open, "empty '{{ }}' interpolation".to_string()));
        }

        if let Some(captures) = VARIABLE.captures(text) {
            bindings.push(DataBindingNode {
                binding_type: BindingType::Variable,
                source: captures[1].to_string(),
                target: "textContent".to_string(),
                is_reactive: false,
                update_strategy: UpdateStrategy::Immediate,
                location,
                expression: None,
                arguments: None,
                range,
            });
        } else if BARE_IDENTIFIER.is_match(text) {
            let message = format!("'{}' must reference a variable with the dollar prefix, e.g. '{{{{${}}}}}'", text, text);
            return Err(binding_error(index, text_start, text.len(), message));
        } else {
            let tokens = lex_at(text, text_start, index)?;
            let expression = Parser::new(source, &tokens, index).parse_standalone_expression()?;
            expressions.push(expression);
            bindings.push(DataBindingNode {
                binding_type: BindingType::Expression,
                source: text.to_string(),
                target: "textContent".to_string(),
                is_reactive: false,
                update_strategy: UpdateStrategy::Immediate,
                location,
                expression: Some(expressions.len() - 1),
                arguments: None,
                range,
            });
        }
        cursor = end;
    }
    Ok(())
}

fn collect_events(
    source: &str,
    block: &TemplateBlock,
    index: &LineIndex<'_>,
    bindings: &mut Vec<DataBindingNode>,
) -> SyntaxResult<()> {
    let content = &source[block.content_start..block.content_end];

    for tag in start_tags(content) {
        let tag_start = block.content_start + tag.start;
        let text = &content[tag];
        let masked = mask_quoted(text);

        if let Some(captures) = UNQUOTED_HANDLER.captures(&masked) {
            let whole = captures.get(0).map_or(0..0, |m| m.range());
            let handler = &captures[2];
            let message = format!(
                "event handler {} on '{}' must be quoted, e.g. {}=\"{}\"",
                handler, &captures[1], &captures[1], handler
            );
            return Err(binding_error(index, tag_start + whole.start, whole.len(), message));
        }

        for captures in QUOTED_ATTRIBUTE.captures_iter(text) {
            let Some(value) = captures.get(2).or_else(|| captures.get(3)) else {
                continue;
            };
            let Some(handler) = HANDLER.captures(value.as_str().trim()) else {
                continue;
            };
            let whole = captures.get(0).map_or(0..0, |m| m.range());
            let start = tag_start + whole.start;
            let arguments = handler
                .get(2)
                .map(|args| args.as_str().trim().to_string())
                .filter(|args| !args.is_empty());

            bindings.push(DataBindingNode {
                binding_type: BindingType::Event,
                source: handler[1].to_string(),
                target: captures[1].to_string(),
                is_reactive: false,
                update_strategy: UpdateStrategy::Immediate,
                location: index.location(start),
                expression: None,
                arguments,
                range: index.range(start, tag_start + whole.end),
            });
        }
    }
    Ok(())
}

/// Byte ranges of the attribute text of every start tag, from after the
/// tag name up to the closing `>`. A `>` inside a quoted value or an
/// interpolation does not end the tag.
fn start_tags(content: &str) -> Vec<Range<usize>> {
    let bytes = content.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(offset) = content[pos..].find('<') {
        let open = pos + offset;
        pos = open + 1;
        if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
            continue;
        }
        while bytes.get(pos).is_some_and(|&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'.')) {
            pos += 1;
        }
        let attributes = pos;
        let mut quote = None;
        while pos < bytes.len() {
            match (quote, bytes[pos]) {
                (Some(q), b) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(bytes[pos]),
                (None, b'{') if bytes.get(pos + 1) == Some(&b'{') => {
                    pos = content[pos..].find("}}").map_or(bytes.len(), |end| pos + end + 1);
                }
                (None, b'>') => break,
                (None, _) => {}
            }
            pos += 1;
        }
        pos = pos.min(bytes.len());
        tags.push(attributes..pos);
    }
    tags
}

/// Blanks out quoted values and `{{ }}` interpolations, keeping byte
/// offsets intact.
fn mask_quoted(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut quote = None;
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let blank = match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                false
            }
            (Some(_), _) => true,
            (None, '{') if depth > 0 || chars.peek() == Some(&'{') => {
                depth += 1;
                true
            }
            (None, '}') if depth > 0 => {
                depth -= 1;
                true
            }
            (None, _) if depth > 0 => true,
            (None, '"' | '\'') => {
                quote = Some(c);
                false
            }
            (None, _) => false,
        };
        if blank {
            masked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    masked
}

fn binding_error(index: &LineIndex<'_>, offset: usize, len: usize, message: String) -> SyntaxError {
    SyntaxError::TemplateBinding {
        message,
        location: index.location(offset),
        span: SourceSpan::new(offset.into(), len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(source: &str) -> SyntaxResult<TemplateNode> {
        let index = LineIndex::new(source);
        let block = locate(source, 0, &index)?.expect("template block");
        parse_template(source, &block, &index)
    }

    #[test]
    fn test_variable_interpolation() {
        let node = template("<template><h1>Hello, {{$name}}</h1></template>").unwrap();
        assert_eq!(node.content, "<h1>Hello, {{$name}}</h1>");
        assert_eq!(node.bindings.len(), 1);
        assert_eq!(node.bindings[0].binding_type, BindingType::Variable);
        assert_eq!(node.bindings[0].source, "name");
        assert_eq!(node.bindings[0].location.column, 22);
    }

    #[test]
    fn test_expression_interpolation() {
        let node = template("<template><p>{{ $count * 2 }}</p></template>").unwrap();
        assert_eq!(node.bindings[0].binding_type, BindingType::Expression);
        assert_eq!(node.bindings[0].source, "$count * 2");
        assert_eq!(node.expressions.len(), 1);
        assert_eq!(node.expressions[0].dollar_references(), vec!["count"]);
    }

    #[test]
    fn test_event_binding_with_arguments() {
        let node = template("<template><button click=\"$add(1, 'x')\">+</button></template>").unwrap();
        let event = &node.bindings[0];
        assert_eq!(event.binding_type, BindingType::Event);
        assert_eq!(event.source, "add");
        assert_eq!(event.target, "click");
        assert_eq!(event.arguments.as_deref(), Some("1, 'x'"));
    }

    #[test]
    fn test_plain_attributes_are_not_bindings() {
        let node = template("<template><a class=\"link\" href='/home'>x</a></template>").unwrap();
        assert!(node.bindings.is_empty());
    }

    #[test]
    fn test_bindings_sorted_by_position() {
        let node = template("<template><button click=\"$inc()\">{{$count}}</button></template>").unwrap();
        assert_eq!(node.bindings[0].binding_type, BindingType::Event);
        assert_eq!(node.bindings[1].binding_type, BindingType::Variable);
    }

    #[test]
    fn test_unclosed_interpolation() {
        let err = template("<template><p>{{$name</p></template>").unwrap_err();
        assert!(err.to_string().contains("unclosed '{{'"));
    }

    #[test]
    fn test_missing_dollar_in_interpolation() {
        let err = template("<template><p>{{name}}</p></template>").unwrap_err();
        assert!(err.to_string().contains("'{{$name}}'"));
    }

    #[test]
    fn test_unquoted_handler() {
        let err = template("<template><button click=$inc()>+</button></template>").unwrap_err();
        assert!(matches!(err, SyntaxError::TemplateBinding { .. }));
        assert!(err.to_string().contains("must be quoted"));
    }

    #[test]
    fn test_text_with_assignment_is_not_a_handler() {
        let node = template("<template>\n  <p>Total = $count</p>\n</template>").unwrap();
        assert!(node.bindings.is_empty());
    }

    #[test]
    fn test_quoted_value_containing_assignment() {
        let node = template("<template><a title=\"a=$b\" click=\"$open()\">x</a></template>").unwrap();
        assert_eq!(node.bindings.len(), 1);
        assert_eq!(node.bindings[0].source, "open");
        assert_eq!(node.bindings[0].target, "click");
    }

    #[test]
    fn test_gt_inside_quoted_value_stays_in_tag() {
        let err = template("<template><button title=\"a > b\" click=$inc>+</button></template>").unwrap_err();
        assert!(err.to_string().contains("event handler $inc on 'click'"));
    }

    #[test]
    fn test_missing_close_tag() {
        let index = LineIndex::new("<template><p></p>");
        let err = locate("<template><p></p>", 0, &index).unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedBlock { .. }));
    }
}
