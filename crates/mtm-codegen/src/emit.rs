//! Expression printing and text layout shared by every target.

use crate::dialect::{Dialect, Place};
use crate::rewrite::{rewrite_code, Rewritten};
use crate::symbols::{StateShape, SymbolKind, Symbols};
use mtm_syntax::{
    ArrowBody, AssignOp, ExprKind, ExpressionNode, FunctionDeclarationNode, Identifier, Literal, Parameter, Property,
};
use std::fmt::Write;

/// Prints `expr` in the target's syntax, lowering `$` references.
pub fn print_expression<D: Dialect + ?Sized>(
    expr: &ExpressionNode,
    dialect: &D,
    symbols: &Symbols,
    place: Place,
) -> String {
    let printer = Printer { dialect, symbols, place };
    let mut out = String::new();
    printer.expression(expr, &mut out);
    out
}

/// `(a, b)` with dollar prefixes dropped.
pub fn parameter_list(parameters: &[Parameter]) -> String {
    let names: Vec<&str> = parameters
        .iter()
        .map(|param| param.name.trim_start_matches('$'))
        .collect();
    format!("({})", names.join(", "))
}

/// `[async] (params) => body` for a function declaration, with the body
/// lowered. The reads are those of the body.
pub fn arrow_function<D: Dialect + ?Sized>(func: &FunctionDeclarationNode, dialect: &D, symbols: &Symbols) -> Rewritten {
    let body = rewrite_code(&func.body.source, dialect, symbols, Place::Script);
    let lowered = if func.body.is_expression {
        body.code.trim().to_string()
    } else {
        braced(&body.code)
    };
    let code = format!(
        "{}{} => {}",
        if func.is_async { "async " } else { "" },
        parameter_list(&func.parameters),
        lowered
    );
    Rewritten { code, reads: body.reads }
}

struct Printer<'a, D: ?Sized> {
    dialect: &'a D,
    symbols: &'a Symbols,
    place: Place,
}

impl<D: Dialect + ?Sized> Printer<'_, D> {
    fn expression(&self, expr: &ExpressionNode, out: &mut String) {
        match &expr.kind {
            ExprKind::Literal(literal) => self.literal(literal, out),
            ExprKind::Identifier(ident) => out.push_str(&self.reference(ident)),
            ExprKind::Array(elements) => {
                out.push('[');
                self.list(elements, out);
                out.push(']');
            }
            ExprKind::Object(properties) => self.object(properties, out),
            ExprKind::Unary { op, operand } => {
                out.push_str(op.symbol());
                self.expression(operand, out);
            }
            ExprKind::Binary { op, left, right } => {
                self.expression(left, out);
                let _ = write!(out, " {} ", op.symbol());
                self.expression(right, out);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.expression(test, out);
                out.push_str(" ? ");
                self.expression(consequent, out);
                out.push_str(" : ");
                self.expression(alternate, out);
            }
            ExprKind::Call { callee, arguments } => {
                self.expression(callee, out);
                out.push('(');
                self.list(arguments, out);
                out.push(')');
            }
            ExprKind::Member { object, property, optional } => {
                self.expression(object, out);
                out.push_str(if *optional { "?." } else { "." });
                out.push_str(property.trim_start_matches('$'));
            }
            ExprKind::Index { object, index } => {
                self.expression(object, out);
                out.push('[');
                self.expression(index, out);
                out.push(']');
            }
            ExprKind::Await(inner) => {
                out.push_str("await ");
                self.expression(inner, out);
            }
            ExprKind::New { callee, arguments } => {
                out.push_str("new ");
                self.expression(callee, out);
                out.push('(');
                self.list(arguments, out);
                out.push(')');
            }
            ExprKind::Assign { op, target, value } => {
                let mut lowered = String::new();
                self.expression(value, &mut lowered);
                match self.state_target(target) {
                    Some((name, shape)) => out.push_str(&self.dialect.write(name, shape, *op, &lowered)),
                    None => {
                        self.expression(target, out);
                        let _ = write!(out, " {} {}", op.symbol(), lowered);
                    }
                }
            }
            ExprKind::Update { increment, prefix, target } => {
                let op = if *increment { AssignOp::Add } else { AssignOp::Sub };
                match self.state_target(target) {
                    Some((name, shape)) => out.push_str(&self.dialect.write(name, shape, op, "1")),
                    None => {
                        let symbol = if *increment { "++" } else { "--" };
                        if *prefix {
                            out.push_str(symbol);
                        }
                        self.expression(target, out);
                        if !*prefix {
                            out.push_str(symbol);
                        }
                    }
                }
            }
            ExprKind::Paren(inner) => {
                out.push('(');
                self.expression(inner, out);
                out.push(')');
            }
            ExprKind::Spread(inner) => {
                out.push_str("...");
                self.expression(inner, out);
            }
            ExprKind::ArrowFunction { parameters, body, is_async } => {
                if *is_async {
                    out.push_str("async ");
                }
                out.push_str(&parameter_list(parameters));
                out.push_str(" => ");
                match body {
                    ArrowBody::Expression(inner) => self.expression(inner, out),
                    ArrowBody::Block(block) => {
                        let lowered = rewrite_code(&block.source, self.dialect, self.symbols, self.place);
                        out.push_str(&braced(&lowered.code));
                    }
                }
            }
        }
    }

    fn literal(&self, literal: &Literal, out: &mut String) {
        match literal {
            Literal::String(value) => out.push_str(&self.dialect.quote().quote(value)),
            Literal::Number { raw, .. } => out.push_str(raw),
            Literal::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
            Literal::Null => out.push_str("null"),
            Literal::Undefined => out.push_str("undefined"),
            Literal::Template(raw) => {
                out.push_str(&rewrite_code(raw, self.dialect, self.symbols, self.place).code);
            }
        }
    }

    fn reference(&self, ident: &Identifier) -> String {
        if !ident.has_dollar_prefix {
            return ident.name.clone();
        }
        match self.symbols.kind(&ident.name) {
            Some(SymbolKind::State(shape)) => self.dialect.read(&ident.name, shape, self.place),
            None if self.place == Place::Markup => {
                self.dialect.read(&ident.name, StateShape::Value, self.place)
            }
            _ => ident.name.clone(),
        }
    }

    fn state_target<'e>(&self, target: &'e ExpressionNode) -> Option<(&'e str, StateShape)> {
        match &target.unparenthesized().kind {
            ExprKind::Identifier(ident) if ident.has_dollar_prefix => {
                self.symbols.state(&ident.name).map(|shape| (ident.name.as_str(), shape))
            }
            _ => None,
        }
    }

    fn list(&self, items: &[ExpressionNode], out: &mut String) {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            self.expression(item, out);
        }
    }

    fn object(&self, properties: &[Property], out: &mut String) {
        if properties.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push_str("{ ");
        for (idx, property) in properties.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            let key = property.key.trim_start_matches('$');
            let mut value = String::new();
            self.expression(&property.value, &mut value);
            if property.shorthand && value == key {
                out.push_str(key);
                continue;
            }
            if is_identifier(key) || key.parse::<f64>().is_ok() {
                out.push_str(key);
            } else {
                out.push_str(&self.dialect.quote().quote(key));
            }
            out.push_str(": ");
            out.push_str(&value);
        }
        out.push_str(" }");
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .map_or(false, |first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Lines of `code` with blank leading and trailing lines dropped and the
/// common indentation removed.
///
/// Text on the first line is taken to follow an opening brace, so it does
/// not count towards the common indentation.
pub fn normalize_lines(code: &str) -> Vec<String> {
    let mut lines: Vec<&str> = code.lines().collect();
    let first_inline = !code.trim_start_matches([' ', '\t']).starts_with(['\n', '\r']);
    while lines.last().map_or(false, |line| line.trim().is_empty()) {
        lines.pop();
    }
    let mut skip = 0;
    while lines.get(skip).map_or(false, |line| line.trim().is_empty()) {
        skip += 1;
    }
    let lines = &lines[skip..];
    let inline = first_inline && skip == 0;

    let margin = lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| !(inline && *idx == 0) && !line.trim().is_empty())
        .map(|(_, line)| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if inline && idx == 0 {
                line.trim().to_string()
            } else if line.trim().is_empty() {
                String::new()
            } else {
                line[margin.min(line.len() - line.trim_start().len())..].trim_end().to_string()
            }
        })
        .collect()
}

/// Indents every non-empty line of `text` by `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", pad, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{ ... }` around a statement body, one statement per line.
pub fn braced(code: &str) -> String {
    let lines = normalize_lines(code);
    if lines.is_empty() {
        return "{}".to_string();
    }
    format!("{{\n{}\n}}", indent(&lines.join("\n"), 2))
}

/// Joins non-empty sections with a blank line between them.
pub fn join_sections<I>(sections: I) -> String
where
    I: IntoIterator<Item = String>,
{
    sections
        .into_iter()
        .filter(|section| !section.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReactTransformer, VueTransformer};
    use mtm_syntax::parse_expression;

    fn print_with<D: Dialect>(dialect: &D, source: &str) -> String {
        let expr = parse_expression(source).unwrap();
        print_expression(&expr, dialect, &Symbols::default(), Place::Script)
    }

    #[test]
    fn test_literals_follow_target_quotes() {
        assert_eq!(print_with(&ReactTransformer::default(), "'hello'"), r#""hello""#);
        assert_eq!(print_with(&VueTransformer::default(), r#""it's""#), r"'it\'s'");
        assert_eq!(print_with(&VueTransformer::default(), "1.50"), "1.50");
    }

    #[test]
    fn test_compound_expressions() {
        let react = ReactTransformer::default();
        assert_eq!(print_with(&react, "{ name: 'Ada', tags: ['a', 'b'], \"full name\": null }"), r#"{ name: "Ada", tags: ["a", "b"], "full name": null }"#);
        assert_eq!(print_with(&react, "items?.length > 0 ? items[0] : undefined"), "items?.length > 0 ? items[0] : undefined");
        assert_eq!(print_with(&react, "!(a && b)"), "!(a && b)");
        assert_eq!(print_with(&react, "{}"), "{}");
    }

    #[test]
    fn test_normalize_lines() {
        assert_eq!(normalize_lines("\n    a\n      b\n\n    c\n  "), vec!["a", "  b", "", "c"]);
        assert_eq!(normalize_lines(" a\n    b\n  "), vec!["a", "b"]);
        assert!(normalize_lines("  \n ").is_empty());
    }

    #[test]
    fn test_braced() {
        assert_eq!(braced("\n    run()\n    done()\n"), "{\n  run()\n  done()\n}");
        assert_eq!(braced(" one() "), "{\n  one()\n}");
        assert_eq!(braced("  "), "{}");
    }
}
