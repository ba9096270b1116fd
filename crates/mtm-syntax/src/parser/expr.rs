use super::Parser;
use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::{SyntaxError, SyntaxResult};

impl<'a> Parser<'a> {
    /// Parses one expression that must consume every token.
    pub(crate) fn parse_standalone_expression(&mut self) -> SyntaxResult<ExpressionNode> {
        self.nesting += 1;
        let expression = self.parse_expression()?;
        self.nesting -= 1;
        match self.peek() {
            Some(tok) => Err(self.unexpected(tok, "end of expression")),
            None => Ok(expression),
        }
    }

    pub(crate) fn parse_expression(&mut self) -> SyntaxResult<ExpressionNode> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> SyntaxResult<ExpressionNode> {
        if self.arrow_ahead("arrow function")? {
            return self.parse_arrow_expression("arrow function");
        }
        let target = self.parse_conditional()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => AssignOp::Assign,
            Some(TokenKind::PlusEq) => AssignOp::Add,
            Some(TokenKind::MinusEq) => AssignOp::Sub,
            Some(TokenKind::StarEq) => AssignOp::Mul,
            Some(TokenKind::SlashEq) => AssignOp::Div,
            _ => return Ok(target),
        };
        self.next();
        let value = self.parse_assignment()?;
        let range = self.range(target.range.start.index, value.range.end.index);
        Ok(ExpressionNode::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            range,
        ))
    }

    fn parse_conditional(&mut self) -> SyntaxResult<ExpressionNode> {
        let test = self.parse_binary(0)?;
        if self.eat(TokenKind::Question).is_none() {
            return Ok(test);
        }
        self.nesting += 1;
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon, "':' in conditional expression")?;
        let alternate = self.parse_assignment()?;
        self.nesting -= 1;
        let range = self.range(test.range.start.index, alternate.range.end.index);
        Ok(ExpressionNode::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            range,
        ))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> SyntaxResult<ExpressionNode> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek().and_then(binary_op) {
            if op.precedence() <= min_precedence {
                break;
            }
            self.next();
            let right = self.parse_binary(op.precedence())?;
            let range = self.range(left.range.start.index, right.range.end.index);
            left = ExpressionNode::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                range,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> SyntaxResult<ExpressionNode> {
        let Some(tok) = self.peek() else {
            return Err(self.eof("an expression"));
        };
        let op = match tok.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Ident if tok.lexeme == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.next();
            let operand = self.parse_unary()?;
            let range = self.range(tok.start(), operand.range.end.index);
            return Ok(ExpressionNode::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                range,
            ));
        }

        match tok.kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.next();
                let target = self.parse_unary()?;
                let range = self.range(tok.start(), target.range.end.index);
                Ok(ExpressionNode::new(
                    ExprKind::Update {
                        increment: tok.kind == TokenKind::PlusPlus,
                        prefix: true,
                        target: Box::new(target),
                    },
                    range,
                ))
            }
            TokenKind::Ident if tok.lexeme == "await" => {
                self.next();
                let inner = self.parse_unary()?;
                let range = self.range(tok.start(), inner.range.end.index);
                Ok(ExpressionNode::new(ExprKind::Await(Box::new(inner)), range))
            }
            TokenKind::Ident if tok.lexeme == "new" => {
                self.next();
                let callee = self.parse_primary()?;
                let callee = self.parse_member_chain(callee)?;
                let arguments = if self.at(TokenKind::LParen) {
                    self.next();
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                let range = self.range(tok.start(), self.previous_end());
                let expression = ExpressionNode::new(
                    ExprKind::New {
                        callee: Box::new(callee),
                        arguments,
                    },
                    range,
                );
                self.parse_postfix(expression)
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// `.name` accesses only; used for `new` callees.
    fn parse_member_chain(&mut self, mut object: ExpressionNode) -> SyntaxResult<ExpressionNode> {
        while self.eat(TokenKind::Dot).is_some() {
            object = self.finish_member(object, false)?;
        }
        Ok(object)
    }

    fn parse_postfix(&mut self, mut expression: ExpressionNode) -> SyntaxResult<ExpressionNode> {
        loop {
            let Some(tok) = self.peek() else {
                return Ok(expression);
            };
            match tok.kind {
                TokenKind::Dot => {
                    self.next();
                    expression = self.finish_member(expression, false)?;
                }
                TokenKind::OptionalDot => {
                    self.next();
                    expression = self.finish_member(expression, true)?;
                }
                TokenKind::LParen | TokenKind::LBracket if tok.newline_before && self.nesting == 0 => {
                    return Err(SyntaxError::AsiAmbiguity {
                        found: tok.lexeme.to_string(),
                        location: self.location(tok.start()),
                        span: tok.span,
                    });
                }
                TokenKind::LParen => {
                    self.next();
                    let arguments = self.parse_arguments()?;
                    let range = self.range(expression.range.start.index, self.previous_end());
                    expression = ExpressionNode::new(
                        ExprKind::Call {
                            callee: Box::new(expression),
                            arguments,
                        },
                        range,
                    );
                }
                TokenKind::LBracket => {
                    self.next();
                    self.nesting += 1;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    self.nesting -= 1;
                    let range = self.range(expression.range.start.index, self.previous_end());
                    expression = ExpressionNode::new(
                        ExprKind::Index {
                            object: Box::new(expression),
                            index: Box::new(index),
                        },
                        range,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus if !tok.newline_before => {
                    self.next();
                    let range = self.range(expression.range.start.index, tok.end());
                    expression = ExpressionNode::new(
                        ExprKind::Update {
                            increment: tok.kind == TokenKind::PlusPlus,
                            prefix: false,
                            target: Box::new(expression),
                        },
                        range,
                    );
                }
                _ => return Ok(expression),
            }
        }
    }

    fn finish_member(&mut self, object: ExpressionNode, optional: bool) -> SyntaxResult<ExpressionNode> {
        let property = match self.peek() {
            Some(tok) if matches!(tok.kind, TokenKind::Ident | TokenKind::DollarIdent) => {
                self.next();
                tok.lexeme.to_string()
            }
            Some(tok) => return Err(self.unexpected(tok, "a property name")),
            None => return Err(self.eof("a property name")),
        };
        let range = self.range(object.range.start.index, self.previous_end());
        Ok(ExpressionNode::new(
            ExprKind::Member {
                object: Box::new(object),
                property,
                optional,
            },
            range,
        ))
    }

    /// Arguments after an already consumed `(`.
    fn parse_arguments(&mut self) -> SyntaxResult<Vec<ExpressionNode>> {
        self.nesting += 1;
        let mut arguments = Vec::new();
        while !self.at(TokenKind::RParen) {
            arguments.push(self.parse_element()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')' or ','")?;
        self.nesting -= 1;
        Ok(arguments)
    }

    /// An array element or call argument, which may be spread.
    fn parse_element(&mut self) -> SyntaxResult<ExpressionNode> {
        if let Some(spread) = self.eat(TokenKind::Spread) {
            let inner = self.parse_assignment()?;
            let range = self.range(spread.start(), inner.range.end.index);
            return Ok(ExpressionNode::new(ExprKind::Spread(Box::new(inner)), range));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> SyntaxResult<ExpressionNode> {
        let Some(tok) = self.next() else {
            return Err(self.eof("an expression"));
        };
        let range = self.range(tok.start(), tok.end());
        let kind = match tok.kind {
            TokenKind::Number => ExprKind::Literal(Literal::Number {
                raw: tok.lexeme.to_string(),
                value: tok.lexeme.parse().unwrap_or(f64::NAN),
            }),
            TokenKind::String => ExprKind::Literal(Literal::String(unescape(tok.lexeme))),
            TokenKind::TemplateString => ExprKind::Literal(Literal::Template(tok.lexeme.to_string())),
            TokenKind::DollarIdent => ExprKind::Identifier(Identifier {
                name: tok.lexeme[1..].to_string(),
                has_dollar_prefix: true,
            }),
            TokenKind::Dollar => return Err(self.invalid_identifier(tok)),
            TokenKind::Ident => match tok.lexeme {
                "true" => ExprKind::Literal(Literal::Boolean(true)),
                "false" => ExprKind::Literal(Literal::Boolean(false)),
                "null" => ExprKind::Literal(Literal::Null),
                "undefined" => ExprKind::Literal(Literal::Undefined),
                "function" => {
                    return Err(SyntaxError::FunctionKeyword {
                        location: self.location(tok.start()),
                        span: tok.span,
                    })
                }
                name => ExprKind::Identifier(Identifier {
                    name: name.to_string(),
                    has_dollar_prefix: false,
                }),
            },
            TokenKind::LParen => {
                self.nesting += 1;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                self.nesting -= 1;
                let range = self.range(tok.start(), self.previous_end());
                return Ok(ExpressionNode::new(ExprKind::Paren(Box::new(inner)), range));
            }
            TokenKind::LBracket => {
                self.nesting += 1;
                let mut elements = Vec::new();
                while !self.at(TokenKind::RBracket) {
                    elements.push(self.parse_element()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "']' or ','")?;
                self.nesting -= 1;
                let range = self.range(tok.start(), self.previous_end());
                return Ok(ExpressionNode::new(ExprKind::Array(elements), range));
            }
            TokenKind::LBrace => {
                let properties = self.parse_object_body()?;
                let range = self.range(tok.start(), self.previous_end());
                return Ok(ExpressionNode::new(ExprKind::Object(properties), range));
            }
            _ => return Err(self.unexpected(tok, "an expression")),
        };
        Ok(ExpressionNode::new(kind, range))
    }

    /// Object literal properties after an already consumed `{`.
    fn parse_object_body(&mut self) -> SyntaxResult<Vec<Property>> {
        self.nesting += 1;
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let Some(key_tok) = self.next() else {
                return Err(self.eof("a property name or '}'"));
            };
            let key = match key_tok.kind {
                TokenKind::Ident | TokenKind::DollarIdent | TokenKind::Number => key_tok.lexeme.to_string(),
                TokenKind::String => unescape(key_tok.lexeme),
                _ => return Err(self.unexpected(key_tok, "a property name")),
            };
            let value = if self.eat(TokenKind::Colon).is_some() {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let shorthand = value.is_none();
            let value = match value {
                Some(value) => value,
                None if key_tok.kind == TokenKind::Ident || key_tok.kind == TokenKind::DollarIdent => {
                    let key_range = self.range(key_tok.start(), key_tok.end());
                    let ident = Identifier {
                        name: key.trim_start_matches('$').to_string(),
                        has_dollar_prefix: key_tok.kind == TokenKind::DollarIdent,
                    };
                    ExpressionNode::new(ExprKind::Identifier(ident), key_range)
                }
                None => return Err(self.unexpected(key_tok, "':' after property name")),
            };
            properties.push(Property { key, value, shorthand });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}' or ','")?;
        self.nesting -= 1;
        Ok(properties)
    }

    /// Whether the upcoming tokens start an arrow function. A parameter list
    /// followed directly by `{` is reported as a missing `=>`.
    pub(crate) fn arrow_ahead(&self, name: &str) -> SyntaxResult<bool> {
        let Some(first) = self.peek() else {
            return Ok(false);
        };
        let (start, offset) = if first.is_ident("async") {
            match self.peek_nth(1) {
                Some(tok) if matches!(tok.kind, TokenKind::LParen | TokenKind::Ident) => (self.pos + 1, 1),
                _ => return Ok(false),
            }
        } else {
            (self.pos, 0)
        };
        let Some(tok) = self.tokens.get(start) else {
            return Ok(false);
        };
        match tok.kind {
            TokenKind::Ident | TokenKind::DollarIdent => {
                Ok(self.peek_nth(offset + 1).map(|next| next.kind) == Some(TokenKind::Arrow))
            }
            TokenKind::LParen => {
                let Some(close) = self.matching_close(start) else {
                    return Ok(false);
                };
                match self.tokens.get(close + 1) {
                    Some(next) if next.kind == TokenKind::Arrow => Ok(true),
                    Some(next) if next.kind == TokenKind::LBrace && self.is_parameter_list(start, close) => {
                        Err(SyntaxError::MissingArrow {
                            name: name.trim_start_matches('$').to_string(),
                            location: self.location(next.start()),
                            span: next.span,
                        })
                    }
                    _ => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    /// Tokens between `open` and `close` look like `a, b, $c`.
    fn is_parameter_list(&self, open: usize, close: usize) -> bool {
        self.tokens[open + 1..close].iter().enumerate().all(|(idx, tok)| {
            if idx % 2 == 0 {
                matches!(tok.kind, TokenKind::Ident | TokenKind::DollarIdent)
            } else {
                tok.kind == TokenKind::Comma
            }
        })
    }

    fn parse_arrow_expression(&mut self, name: &str) -> SyntaxResult<ExpressionNode> {
        let start = self.peek().map(Token::start).unwrap_or(0);
        let arrow = self.parse_arrow(name)?;
        let range = self.range(start, self.previous_end());
        let body = if arrow.body.is_expression {
            match arrow.expression {
                Some(expression) => ArrowBody::Expression(Box::new(expression)),
                None => ArrowBody::Block(arrow.body),
            }
        } else {
            ArrowBody::Block(arrow.body)
        };
        Ok(ExpressionNode::new(
            ExprKind::ArrowFunction {
                parameters: arrow.parameters,
                body,
                is_async: arrow.is_async,
            },
            range,
        ))
    }

    pub(crate) fn invalid_identifier(&self, dollar: &Token<'_>) -> SyntaxError {
        let rest = &self.source[dollar.start()..];
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | ':' | '!' | ';' | '(' | ')'))
            .unwrap_or(rest.len());
        SyntaxError::InvalidIdentifier {
            name: rest[..end.max(1)].to_string(),
            location: self.location(dollar.start()),
            span: dollar.span,
        }
    }
}

fn binary_op(tok: &Token<'_>) -> Option<BinaryOp> {
    Some(match tok.kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::StrictEq => BinaryOp::StrictEq,
        TokenKind::StrictNotEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::Nullish => BinaryOp::Nullish,
        _ => return None,
    })
}

/// Value of a quoted string literal.
pub(crate) fn unescape(lexeme: &str) -> String {
    let inner = &lexeme[1..lexeme.len().saturating_sub(1).max(1)];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use mtm_source::LineIndex;

    fn expr(source: &str) -> SyntaxResult<ExpressionNode> {
        let tokens = lex(source)?;
        let index = LineIndex::new(source);
        Parser::new(source, &tokens, &index).parse_standalone_expression()
    }

    #[test]
    fn test_precedence() {
        let node = expr("$a + $b * 2").unwrap();
        let ExprKind::Binary { op, right, .. } = node.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_left_associative() {
        let node = expr("10 - 4 - 3").unwrap();
        let ExprKind::Binary { left, .. } = node.kind else {
            panic!("expected binary");
        };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn test_calls_members_and_index() {
        let node = expr("$items.filter(x => x.done)[0]?.title").unwrap();
        assert!(matches!(node.kind, ExprKind::Member { optional: true, .. }));
        assert_eq!(node.dollar_references(), vec!["items"]);
    }

    #[test]
    fn test_object_and_array_literals() {
        let node = expr("{ name: 'x', tags: [1, 2], $count }").unwrap();
        let ExprKind::Object(properties) = &node.kind else {
            panic!("expected object");
        };
        assert_eq!(properties.len(), 3);
        assert!(properties[2].shorthand);
        assert_eq!(node.literal_depth(), 2);
    }

    #[test]
    fn test_string_unescape() {
        let node = expr(r#""say \"hi\"\n""#).unwrap();
        assert_eq!(node.kind, ExprKind::Literal(Literal::String("say \"hi\"\n".into())));
    }

    #[test]
    fn test_arrow_with_expression_body() {
        let node = expr("async (a, b) => a + b").unwrap();
        let ExprKind::ArrowFunction { parameters, body, is_async } = node.kind else {
            panic!("expected arrow");
        };
        assert!(is_async);
        assert_eq!(parameters.len(), 2);
        assert!(matches!(body, ArrowBody::Expression(_)));
    }

    #[test]
    fn test_missing_arrow() {
        let err = expr("(a) { return a }").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingArrow { .. }));
    }

    #[test]
    fn test_function_keyword() {
        let err = expr("function () {}").unwrap_err();
        assert!(matches!(err, SyntaxError::FunctionKeyword { .. }));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = expr("$a $b").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_new_expression() {
        let node = expr("new Date().getTime()").unwrap();
        let ExprKind::Call { callee, .. } = node.kind else {
            panic!("expected call");
        };
        assert!(matches!(callee.kind, ExprKind::Member { .. }));
    }
}
