//! Token-level lowering of opaque code: function bodies, handler
//! arguments and template literal interpolations.
//!
//! Only `$name` tokens are touched. Everything between them, comments and
//! formatting included, is copied from the input unchanged.

use crate::dialect::{Dialect, Place};
use crate::symbols::{StateShape, SymbolKind, Symbols};
use indexmap::IndexSet;
use mtm_syntax::lexer::{lex_lenient, Token, TokenKind};
use mtm_syntax::AssignOp;

/// Lowered code plus the reactive state it reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rewritten {
    pub code: String,
    /// Reactive variables read rather than only assigned, in first-read order
    pub reads: Vec<String>,
}

/// Lowers every `$name` in `source` for `dialect`.
///
/// Assignments and updates of reactive state become the target's write
/// form, other references to state its read form, and every other `$name`
/// loses the prefix.
pub fn rewrite_code<D: Dialect + ?Sized>(source: &str, dialect: &D, symbols: &Symbols, place: Place) -> Rewritten {
    let tokens = lex_lenient(source);
    let mut rewriter = Rewriter {
        source,
        tokens: &tokens,
        dialect,
        symbols,
        place,
        reads: IndexSet::new(),
    };
    let code = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => {
            let mut code = source[..first.start()].to_string();
            code.push_str(&rewriter.region(0, tokens.len()));
            code.push_str(&source[last.end()..]);
            code
        }
        _ => source.to_string(),
    };
    Rewritten {
        code,
        reads: rewriter.reads.into_iter().collect(),
    }
}

struct Rewriter<'s, 't, D: ?Sized> {
    source: &'s str,
    tokens: &'t [Token<'s>],
    dialect: &'t D,
    symbols: &'t Symbols,
    place: Place,
    reads: IndexSet<String>,
}

impl<'s, D: Dialect + ?Sized> Rewriter<'s, '_, D> {
    /// Lowers tokens `from..to`, copying the text between them.
    fn region(&mut self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        let mut out = String::new();
        let mut cursor = self.tokens[from].start();
        let mut idx = from;

        while idx < to {
            let tok = self.tokens[idx];

            if tok.kind == TokenKind::TemplateString {
                out.push_str(&self.source[cursor..tok.start()]);
                out.push_str(&self.template_literal(tok.lexeme));
                cursor = tok.end();
                idx += 1;
                continue;
            }

            // `++$x` and `--$x`
            if tok.kind.is_update() && idx + 1 < to {
                let next = self.tokens[idx + 1];
                if let Some((name, shape)) = self.state_token(&next) {
                    out.push_str(&self.source[cursor..tok.start()]);
                    out.push_str(&self.dialect.write(name, shape, update_op(tok.kind), "1"));
                    cursor = next.end();
                    idx += 2;
                    continue;
                }
            }

            let Some(name) = tok.dollar_name() else {
                idx += 1;
                continue;
            };
            let member = idx > 0 && matches!(self.tokens[idx - 1].kind, TokenKind::Dot | TokenKind::OptionalDot);
            out.push_str(&self.source[cursor..tok.start()]);
            cursor = tok.end();
            idx += 1;

            let Some(shape) = self.shape(name).filter(|_| !member) else {
                out.push_str(name);
                continue;
            };
            match (idx < to).then(|| self.tokens[idx]) {
                Some(next) if next.kind.is_assignment() => {
                    let value_end = self.statement_end(idx + 1, to);
                    if value_end > idx + 1 {
                        let value = self.region(idx + 1, value_end);
                        out.push_str(&self.dialect.write(name, shape, assign_op(next.kind), &value));
                        cursor = self.tokens[value_end - 1].end();
                        idx = value_end;
                    } else {
                        let read = self.read(name, shape);
                        out.push_str(&read);
                    }
                }
                Some(next) if next.kind.is_update() => {
                    out.push_str(&self.dialect.write(name, shape, update_op(next.kind), "1"));
                    cursor = next.end();
                    idx += 1;
                }
                _ => {
                    let read = self.read(name, shape);
                    out.push_str(&read);
                }
            }
        }

        out.push_str(&self.source[cursor..self.tokens[to - 1].end()]);
        out
    }

    /// State shape of `name`. Markup only ever references component state,
    /// so an undeclared name there is taken to be state too.
    fn shape(&self, name: &str) -> Option<StateShape> {
        match self.symbols.kind(name) {
            Some(SymbolKind::State(shape)) => Some(shape),
            None if self.place == Place::Markup => Some(StateShape::Value),
            _ => None,
        }
    }

    fn state_token(&self, tok: &Token<'s>) -> Option<(&'s str, StateShape)> {
        let name = tok.dollar_name()?;
        Some((name, self.shape(name)?))
    }

    fn read(&mut self, name: &str, shape: StateShape) -> String {
        if self.symbols.state(name).is_some() {
            self.reads.insert(name.to_string());
        }
        self.dialect.read(name, shape, self.place)
    }

    /// Token index just past the expression starting at `from`.
    fn statement_end(&self, from: usize, limit: usize) -> usize {
        let mut depth = 0usize;
        let mut idx = from;
        while idx < limit {
            let tok = self.tokens[idx];
            if depth == 0 && idx > from && tok.newline_before && !continues(self.tokens[idx - 1].kind, tok.kind) {
                break;
            }
            if tok.kind.is_opening() {
                depth += 1;
            } else if tok.kind.is_closing() {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if depth == 0 && matches!(tok.kind, TokenKind::Semicolon | TokenKind::Comma) {
                break;
            }
            idx += 1;
        }
        idx
    }

    /// Lowers the `${...}` parts of a backtick literal.
    fn template_literal(&mut self, lexeme: &str) -> String {
        let mut out = String::with_capacity(lexeme.len());
        let mut rest = lexeme;
        while let Some(open) = rest.find("${") {
            let inner_start = open + 2;
            let Some(close) = matching_brace(&rest[inner_start..]) else {
                break;
            };
            out.push_str(&rest[..inner_start]);
            let inner = rewrite_code(&rest[inner_start..inner_start + close], self.dialect, self.symbols, self.place);
            self.reads.extend(inner.reads);
            out.push_str(&inner.code);
            out.push('}');
            rest = &rest[inner_start + close + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// A line break between `previous` and `next` does not end the expression.
fn continues(previous: TokenKind, next: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        previous,
        Plus | Minus
            | Star
            | Slash
            | Percent
            | Eq
            | PlusEq
            | MinusEq
            | StarEq
            | SlashEq
            | EqEq
            | NotEq
            | StrictEq
            | StrictNotEq
            | Lt
            | Gt
            | LtEq
            | GtEq
            | AndAnd
            | OrOr
            | Nullish
            | Question
            | Colon
            | Arrow
            | Comma
            | Dot
            | OptionalDot
            | Bang
    ) || matches!(next, Dot | OptionalDot | Question | Colon | AndAnd | OrOr | Nullish | Arrow)
}

fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(idx),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn assign_op(kind: TokenKind) -> AssignOp {
    match kind {
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        _ => AssignOp::Assign,
    }
}

fn update_op(kind: TokenKind) -> AssignOp {
    match kind {
        TokenKind::PlusPlus => AssignOp::Add,
        _ => AssignOp::Sub,
    }
}
