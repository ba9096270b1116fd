use super::expr::unescape;
use super::Parser;
use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::{SyntaxError, SyntaxResult};
use miette::SourceSpan;

const DECLARATION_KEYWORDS: [&str; 3] = ["let", "const", "var"];

/// Pieces of an arrow function shared by declarations and expressions.
pub(crate) struct ArrowParts {
    pub parameters: Vec<Parameter>,
    pub body: BlockStatementNode,
    /// Parsed concise body, when the body is `=> expr`
    pub expression: Option<ExpressionNode>,
    pub is_async: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_statements(&mut self) -> SyntaxResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(TokenKind::Semicolon).is_some() {}
            let Some(tok) = self.peek() else {
                break;
            };
            let statement = self.parse_statement(tok)?;
            self.expect_terminator()?;
            statements.push(statement);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self, tok: &'a Token<'a>) -> SyntaxResult<Statement> {
        match tok.kind {
            TokenKind::DollarIdent => self.parse_dollar_statement(),
            TokenKind::Dollar => Err(self.invalid_identifier(tok)),
            TokenKind::Ident if DECLARATION_KEYWORDS.contains(&tok.lexeme) => {
                let name = self
                    .peek_nth(1)
                    .map(|next| next.lexeme.trim_start_matches('$'))
                    .unwrap_or("name");
                Err(SyntaxError::DeclarationKeyword {
                    keyword: tok.lexeme.to_string(),
                    name: name.to_string(),
                    location: self.location(tok.start()),
                    span: tok.span,
                })
            }
            TokenKind::Ident if tok.lexeme == "function" => Err(SyntaxError::FunctionKeyword {
                location: self.location(tok.start()),
                span: tok.span,
            }),
            TokenKind::Ident if tok.lexeme == "import" => self.parse_import(),
            TokenKind::Ident if self.looks_like_declaration() => Err(SyntaxError::MissingDollarPrefix {
                name: tok.lexeme.to_string(),
                location: self.location(tok.start()),
                span: SourceSpan::new(tok.span.offset().into(), 0),
            }),
            _ => {
                let expression = self.parse_expression()?;
                let range = expression.range;
                Ok(Statement::Expression(ExpressionStatementNode { expression, range }))
            }
        }
    }

    /// `name = ...`, `name! = ...` or `name: type = ...` at statement start.
    fn looks_like_declaration(&self) -> bool {
        match self.peek_nth(1).map(|tok| tok.kind) {
            Some(TokenKind::Eq) | Some(TokenKind::Colon) => true,
            Some(TokenKind::Bang) => self.peek_nth(2).map(|tok| tok.kind) == Some(TokenKind::Eq),
            _ => false,
        }
    }

    /// After a statement: end of input, `;`, or a line break.
    fn expect_terminator(&mut self) -> SyntaxResult<()> {
        match self.peek() {
            None => {
                self.omitted_semicolon = true;
                Ok(())
            }
            Some(tok) if tok.kind == TokenKind::Semicolon => {
                self.next();
                Ok(())
            }
            Some(tok) if tok.newline_before => {
                self.omitted_semicolon = true;
                Ok(())
            }
            Some(tok) => Err(self.unexpected(tok, "';' or a line break")),
        }
    }

    fn parse_dollar_statement(&mut self) -> SyntaxResult<Statement> {
        let start = self.pos;
        let name_tok = self.expect(TokenKind::DollarIdent, "a '$' identifier")?;
        let name = name_tok.lexeme[1..].to_string();

        let mut has_reactive_suffix = false;
        if let Some(bang) = self.peek().filter(|tok| tok.kind == TokenKind::Bang) {
            if bang.start() != name_tok.end() {
                return Err(SyntaxError::ReactiveSuffix {
                    name,
                    location: self.location(name_tok.end()),
                    span: SourceSpan::new(name_tok.end().into(), bang.start() - name_tok.end()),
                });
            }
            self.next();
            has_reactive_suffix = true;
        }

        let type_annotation = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Colon => Some(self.parse_type_annotation()?),
            Some(tok) if tok.kind == TokenKind::Ident => {
                return Err(SyntaxError::MissingTypeColon {
                    name,
                    type_name: tok.lexeme.to_string(),
                    location: self.location(tok.start()),
                    span: tok.span,
                });
            }
            _ => None,
        };

        if !self.at(TokenKind::Eq) {
            if !has_reactive_suffix && type_annotation.is_none() {
                // `$count += 1` and friends are plain expression statements
                self.pos = start;
                let expression = self.parse_expression()?;
                let range = expression.range;
                return Ok(Statement::Expression(ExpressionStatementNode { expression, range }));
            }
            return match self.peek() {
                Some(tok) => Err(self.unexpected(tok, &format!("'=' after '${}'", name))),
                None => Err(self.eof(&format!("'=' after '${}'", name))),
            };
        }
        self.next();

        if let Some(tok) = self.peek().filter(|tok| tok.is_ident("function")) {
            return Err(SyntaxError::FunctionKeyword {
                location: self.location(tok.start()),
                span: tok.span,
            });
        }

        let name_range = self.range(name_tok.start(), name_tok.end());
        if self.arrow_ahead(&name)? && !has_reactive_suffix && type_annotation.is_none() {
            let arrow = self.parse_arrow(&name)?;
            return Ok(Statement::Function(FunctionDeclarationNode {
                name,
                has_dollar_prefix: true,
                parameters: arrow.parameters,
                body: arrow.body,
                is_arrow: true,
                auto_bind_this: true,
                is_async: arrow.is_async,
                range: self.range(name_tok.start(), self.previous_end()),
            }));
        }

        let initializer = self.parse_expression()?;
        let declaration = VariableDeclarationNode {
            name,
            has_dollar_prefix: true,
            has_reactive_suffix,
            type_annotation,
            initializer,
            inferred_type: TypeInfo::any(),
            scope: Scope::Local,
            is_reactive: has_reactive_suffix,
            update_triggers: Vec::new(),
            dependencies: Vec::new(),
            range: self.range(name_tok.start(), self.previous_end()),
            name_range,
        };
        Ok(if has_reactive_suffix {
            Statement::ReactiveVariable(declaration)
        } else {
            Statement::Variable(declaration)
        })
    }

    fn parse_type_annotation(&mut self) -> SyntaxResult<TypeAnnotationNode> {
        let colon = self.expect(TokenKind::Colon, "':'")?;
        let type_tok = self.expect(TokenKind::Ident, "a type name")?;

        let (base_type, element_type) = if type_tok.lexeme == "Array" && self.at(TokenKind::Lt) {
            self.next();
            let element_tok = self.expect(TokenKind::Ident, "an element type")?;
            let element = self.base_type(element_tok)?;
            self.expect(TokenKind::Gt, "'>'")?;
            (BaseType::Array, Some(element))
        } else {
            let base = self.base_type(type_tok)?;
            if self.at(TokenKind::LBracket) && self.peek_nth(1).map(|tok| tok.kind) == Some(TokenKind::RBracket) {
                self.next();
                self.next();
                (BaseType::Array, Some(base))
            } else {
                (base, None)
            }
        };

        let nullable = if self.eat(TokenKind::Question).is_some() {
            true
        } else if self.at(TokenKind::Pipe) && self.peek_nth(1).map_or(false, |tok| tok.is_ident("null")) {
            self.next();
            self.next();
            true
        } else {
            false
        };

        let end = self.previous_end();
        Ok(TypeAnnotationNode {
            raw: self.text(type_tok.start(), end).to_string(),
            type_info: TypeInfo { base_type, nullable },
            element_type,
            range: self.range(type_tok.start(), end),
            annotation_range: self.range(colon.start(), end),
        })
    }

    fn base_type(&self, tok: &Token<'_>) -> SyntaxResult<BaseType> {
        BaseType::from_name(tok.lexeme).ok_or_else(|| SyntaxError::UnknownType {
            type_name: tok.lexeme.to_string(),
            location: self.location(tok.start()),
            span: tok.span,
        })
    }

    /// `[async] (params) => body` or `[async] param => body`.
    pub(crate) fn parse_arrow(&mut self, name: &str) -> SyntaxResult<ArrowParts> {
        let is_async = self.eat_ident("async").is_some();

        let mut parameters = Vec::new();
        if self.eat(TokenKind::LParen).is_some() {
            while !self.at(TokenKind::RParen) {
                let param = self.expect_parameter()?;
                parameters.push(param);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')' or ','")?;
        } else {
            parameters.push(self.expect_parameter()?);
        }

        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Arrow => {
                self.next();
            }
            Some(tok) => {
                return Err(SyntaxError::MissingArrow {
                    name: name.trim_start_matches('$').to_string(),
                    location: self.location(tok.start()),
                    span: tok.span,
                })
            }
            None => return Err(self.eof("'=>'")),
        }

        if let Some(open) = self.peek().filter(|tok| tok.kind == TokenKind::LBrace) {
            let Some(close) = self.matching_close(self.pos) else {
                return Err(SyntaxError::UnterminatedBlock {
                    construct: format!("body of '${}', expected '}}'", name.trim_start_matches('$')),
                    location: self.location(open.start()),
                    span: open.span,
                });
            };
            let close_tok = &self.tokens[close];
            let body = BlockStatementNode {
                source: self.text(open.end(), close_tok.start()).to_string(),
                range: self.range(open.end(), close_tok.start()),
                is_expression: false,
            };
            self.pos = close + 1;
            return Ok(ArrowParts {
                parameters,
                body,
                expression: None,
                is_async,
            });
        }

        self.nesting += 1;
        let expression = self.parse_expression()?;
        self.nesting -= 1;
        let body = BlockStatementNode {
            source: self.text(expression.range.start.index, expression.range.end.index).to_string(),
            range: expression.range,
            is_expression: true,
        };
        Ok(ArrowParts {
            parameters,
            body,
            expression: Some(expression),
            is_async,
        })
    }

    fn expect_parameter(&mut self) -> SyntaxResult<Parameter> {
        match self.peek() {
            Some(tok) if matches!(tok.kind, TokenKind::Ident | TokenKind::DollarIdent) => {
                self.next();
                Ok(Parameter {
                    name: tok.lexeme.to_string(),
                    location: self.location(tok.start()),
                })
            }
            Some(tok) => Err(self.unexpected(tok, "a parameter name")),
            None => Err(self.eof("a parameter name")),
        }
    }

    /// `import ... 'module'`, kept verbatim.
    fn parse_import(&mut self) -> SyntaxResult<Statement> {
        let import_tok = self.expect(TokenKind::Ident, "'import'")?;
        let mut depth = 0usize;
        loop {
            let Some(tok) = self.next() else {
                return Err(self.eof("a module string in import"));
            };
            match tok.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::String if depth == 0 => {
                    let range = self.range(import_tok.start(), tok.end());
                    return Ok(Statement::Import(ImportDeclarationNode {
                        source: self.text(import_tok.start(), tok.end()).to_string(),
                        module: unescape(tok.lexeme),
                        range,
                    }));
                }
                TokenKind::Semicolon => return Err(self.unexpected(tok, "a module string in import")),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::{parse, SyntaxError};

    fn program(source: &str) -> ProgramNode {
        match parse(source).unwrap() {
            UnifiedAst::Program(program) => program,
            other => panic!("expected modern program, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_and_reactive_declarations() {
        let program = program("$name = \"x\"\n$count! = 0;\n");
        assert!(matches!(&program.body[0], Statement::Variable(var) if var.name == "name" && !var.is_reactive));
        assert!(matches!(&program.body[1], Statement::ReactiveVariable(var) if var.has_reactive_suffix));
    }

    #[test]
    fn test_type_annotations() {
        let program = program("$a: float = 1\n$b: string[] = []\n$c: Array<number>? = null\n$d: object | null = null\n");
        let types: Vec<_> = program
            .variables()
            .map(|var| var.type_annotation.as_ref().unwrap())
            .map(|ann| (ann.type_info.base_type, ann.type_info.nullable, ann.element_type))
            .collect();
        assert_eq!(
            types,
            vec![
                (BaseType::Float, false, None),
                (BaseType::Array, false, Some(BaseType::String)),
                (BaseType::Array, true, Some(BaseType::Number)),
                (BaseType::Object, true, None),
            ]
        );
        let first = program.variables().next().unwrap().type_annotation.as_ref().unwrap();
        assert_eq!(first.raw, "float");
        assert_eq!(first.annotation_range.start.column, 3);
    }

    #[test]
    fn test_function_declaration() {
        let program = program("$load = async (url, opts) => {\n  $items = await fetch(url)\n}\n");
        let func = program.functions().next().unwrap();
        assert_eq!(func.name, "load");
        assert!(func.is_async && func.is_arrow && func.auto_bind_this);
        assert_eq!(func.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["url", "opts"]);
        assert_eq!(func.body.source.trim(), "$items = await fetch(url)");
    }

    #[test]
    fn test_concise_function_body() {
        let program = program("$double = (n) => n * 2\n");
        let func = program.functions().next().unwrap();
        assert!(func.body.is_expression);
        assert_eq!(func.body.source, "n * 2");
    }

    #[test]
    fn test_reactive_arrow_is_a_variable() {
        let program = program("$handler! = () => {}\n");
        let Statement::ReactiveVariable(var) = &program.body[0] else {
            panic!("expected reactive variable");
        };
        assert!(matches!(var.initializer.kind, ExprKind::ArrowFunction { .. }));
    }

    #[test]
    fn test_imports_and_expression_statements() {
        let program = program("import { a, b } from './x'\n$count! = 0\n$count += 1\nconsole.log($count)\n");
        let import = program.imports().next().unwrap();
        assert_eq!(import.module, "./x");
        assert_eq!(import.source, "import { a, b } from './x'");
        assert!(matches!(program.body[2], Statement::Expression(_)));
        assert!(matches!(program.body[3], Statement::Expression(_)));
    }

    #[test]
    fn test_missing_dollar_prefix() {
        let err = parse("$a = 1\ncount! = 0\n").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingDollarPrefix { ref name, .. } if name == "count"));
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_declaration_keyword() {
        let err = parse("$a = 1\nlet count = 0\n").unwrap_err();
        assert!(err.to_string().contains("'let' declarations are not supported"));
    }

    #[test]
    fn test_space_before_reactive_suffix() {
        let err = parse("$count ! = 0\n").unwrap_err();
        assert!(matches!(err, SyntaxError::ReactiveSuffix { .. }));
        assert_eq!(err.location().column, 7);
    }

    #[test]
    fn test_missing_type_colon() {
        let err = parse("$count number = 0\n").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingTypeColon { ref type_name, .. } if type_name == "number"));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse("$count: integer = 0\n").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownType { .. }));
    }

    #[test]
    fn test_function_keyword_in_declaration() {
        let err = parse("$inc = function () { }\n").unwrap_err();
        assert!(matches!(err, SyntaxError::FunctionKeyword { .. }));
    }

    #[test]
    fn test_missing_arrow_in_declaration() {
        let err = parse("$inc = () {\n}\n").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingArrow { ref name, .. } if name == "inc"));
    }

    #[test]
    fn test_asi_ambiguity() {
        let err = parse("$a = $b\n($c)\n").unwrap_err();
        assert!(matches!(err, SyntaxError::AsiAmbiguity { ref found, .. } if found == "("));
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_statements_on_one_line_need_semicolons() {
        assert!(parse("$a = 1; $b = 2\n").is_ok());
        let err = parse("$a = 1 $b = 2\n").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unterminated_function_body() {
        let err = parse("$inc = () => {\n  $count += 1\n").unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedBlock { .. }));
    }

    #[test]
    fn test_invalid_identifier() {
        let err = parse("$a = 1\n$1abc = 2\n").unwrap_err();
        assert!(matches!(err, SyntaxError::InvalidIdentifier { ref name, .. } if name == "$1abc"));
    }
}
