//! Recursive-descent parser for the modern component syntax.
//!
//! A file is processed in four steps: the `---` frontmatter block is split
//! off and deserialized, the syntax version is detected, the `<template>`
//! block is located, and the remaining script text is tokenized and parsed
//! into statements. Token spans always point into the original file.

mod decl;
mod expr;
mod frontmatter;
mod template;

pub use frontmatter::{split_frontmatter, FrontmatterBlock};

use crate::analysis;
use crate::ast::*;
use crate::lexer::{lex_at, Token, TokenKind};
use crate::{SyntaxError, SyntaxResult};
use miette::SourceSpan;
use mtm_source::{LineIndex, SourceLocation, SourceRange};
use once_cell::sync::Lazy;
use regex::Regex;

/// A body line that starts with a `$` declaration marks the modern syntax.
static MODERN_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\$[A-Za-z_]").expect("Invalid declaration regex pattern"));

/// Parses a complete component source.
pub fn parse(source: &str) -> SyntaxResult<UnifiedAst> {
    let index = LineIndex::new(source);
    let header = split_frontmatter(source, &index)?;
    let body = &source[header.body_start..];
    let version = detect_syntax_version(&header.frontmatter, body);
    log::debug!("Parsing {} syntax component ({} bytes)", version, source.len());

    if version == SyntaxVersion::Legacy {
        return Ok(UnifiedAst::LegacyProgram(LegacyProgramNode {
            content: body.to_string(),
            frontmatter: header.frontmatter,
        }));
    }

    let block = template::locate(source, header.body_start, &index)?;
    let tokens = match &block {
        Some(block) => {
            let mut tokens = lex_at(&source[header.body_start..block.start], header.body_start, &index)?;
            let mut trailing = lex_at(&source[block.end..], block.end, &index)?;
            if let Some(first) = trailing.first_mut() {
                first.newline_before = true;
            }
            tokens.append(&mut trailing);
            tokens
        }
        None => lex_at(body, header.body_start, &index)?,
    };

    let mut parser = Parser::new(source, &tokens, &index);
    let mut statements = parser.parse_statements()?;
    let optional_semicolons = parser.omitted_semicolon;

    if let Some(block) = block {
        let node = template::parse_template(source, &block, &index)?;
        let position = statements
            .iter()
            .position(|statement| statement_start(statement) > block.start)
            .unwrap_or(statements.len());
        statements.insert(position, Statement::Template(node));
    }

    let mut program = ProgramNode {
        body: statements,
        frontmatter: header.frontmatter,
        syntax_version: version,
        modern_features: ModernFeatures {
            optional_semicolons,
            ..ModernFeatures::default()
        },
    };
    analysis::analyze(&mut program);
    log::trace!("Parsed {} top-level statements", program.body.len());
    Ok(UnifiedAst::Program(program))
}

/// Parses a single expression, such as a template binding or an
/// initializer written on its own.
pub fn parse_expression(source: &str) -> SyntaxResult<ExpressionNode> {
    let index = LineIndex::new(source);
    let tokens = lex_at(source, 0, &index)?;
    if tokens.is_empty() {
        return Err(SyntaxError::UnexpectedEof {
            expected: "an expression".to_string(),
            location: SourceLocation::START,
            span: SourceSpan::new(0.into(), 0),
        });
    }
    Parser::new(source, &tokens, &index).parse_standalone_expression()
}

/// Frontmatter `syntax` wins; otherwise a body with at least one
/// `$`-prefixed declaration line is modern.
pub fn detect_syntax_version(frontmatter: &Frontmatter, body: &str) -> SyntaxVersion {
    if let Some(version) = frontmatter.syntax {
        return version;
    }
    if MODERN_DECLARATION.is_match(body) {
        SyntaxVersion::Modern
    } else {
        SyntaxVersion::Legacy
    }
}

fn statement_start(statement: &Statement) -> usize {
    let range = match statement {
        Statement::Variable(var) | Statement::ReactiveVariable(var) => var.range,
        Statement::Function(func) => func.range,
        Statement::Template(template) => template.range,
        Statement::Import(import) => import.range,
        Statement::Expression(expr) => expr.range,
    };
    range.start.index
}

/// Cursor over the script tokens of one file.
pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token<'a>],
    index: &'a LineIndex<'a>,
    pos: usize,
    /// Bracket depth; statement boundaries only matter at depth 0
    nesting: usize,
    /// A statement ended at a line break instead of `;`
    omitted_semicolon: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a [Token<'a>], index: &'a LineIndex<'a>) -> Self {
        Self {
            source,
            tokens,
            index,
            pos: 0,
            nesting: 0,
            omitted_semicolon: false,
        }
    }

    /// Peek at the current token without consuming it.
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|tok| tok.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    /// Consume and return the current token.
    fn next(&mut self) -> Option<&'a Token<'a>> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'a Token<'a>> {
        if self.at(kind) {
            self.next()
        } else {
            None
        }
    }

    fn eat_ident(&mut self, word: &str) -> Option<&'a Token<'a>> {
        match self.peek() {
            Some(tok) if tok.is_ident(word) => self.next(),
            _ => None,
        }
    }

    /// Expect the next token to be of a specific kind.
    fn expect(&mut self, expected: TokenKind, what: &str) -> SyntaxResult<&'a Token<'a>> {
        match self.peek() {
            Some(tok) if tok.kind == expected => {
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(self.unexpected(tok, what)),
            None => Err(self.eof(what)),
        }
    }

    /// End of the previous token, or of the script when nothing was consumed.
    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map(Token::end)
            .unwrap_or(0)
    }

    fn location(&self, offset: usize) -> SourceLocation {
        self.index.location(offset)
    }

    fn range(&self, start: usize, end: usize) -> SourceRange {
        self.index.range(start, end)
    }

    fn text(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    fn unexpected(&self, tok: &Token<'_>, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            found: tok.lexeme.to_string(),
            expected: expected.to_string(),
            location: self.location(tok.start()),
            span: tok.span,
        }
    }

    fn eof(&self, expected: &str) -> SyntaxError {
        let end = self.tokens.last().map(Token::end).unwrap_or(self.source.len());
        SyntaxError::UnexpectedEof {
            expected: expected.to_string(),
            location: self.location(end),
            span: SourceSpan::new(end.into(), 0),
        }
    }

    /// Index of the token closing the bracket opened at `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, tok) in self.tokens[open..].iter().enumerate() {
            if tok.kind.is_opening() {
                depth += 1;
            } else if tok.kind.is_closing() {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_modern_from_declarations() {
        let version = detect_syntax_version(&Frontmatter::default(), "\n  $count! = 0\n");
        assert_eq!(version, SyntaxVersion::Modern);
    }

    #[test]
    fn test_detects_legacy_without_declarations() {
        let version = detect_syntax_version(&Frontmatter::default(), "let count = 0\n<div>{count}</div>");
        assert_eq!(version, SyntaxVersion::Legacy);
    }

    #[test]
    fn test_frontmatter_syntax_wins() {
        let frontmatter = Frontmatter {
            syntax: Some(SyntaxVersion::Legacy),
            ..Frontmatter::default()
        };
        assert_eq!(detect_syntax_version(&frontmatter, "$count! = 0"), SyntaxVersion::Legacy);
    }

    #[test]
    fn test_legacy_passthrough_keeps_body() {
        let ast = parse("---\ntarget: vue\n---\nconst x = 1\n").unwrap();
        match ast {
            UnifiedAst::LegacyProgram(legacy) => {
                assert_eq!(legacy.content, "const x = 1\n");
                assert_eq!(legacy.frontmatter.target, Some(mtm_source::Target::Vue));
            }
            other => panic!("expected legacy program, got {:?}", other),
        }
    }

    #[test]
    fn test_template_is_inserted_in_source_order() {
        let ast = parse("$a = 1\n<template><p>{{$a}}</p></template>\n$b = 2\n").unwrap();
        let program = ast.as_program().unwrap();
        assert!(matches!(program.body[0], Statement::Variable(_)));
        assert!(matches!(program.body[1], Statement::Template(_)));
        assert!(matches!(program.body[2], Statement::Variable(_)));
    }
}
