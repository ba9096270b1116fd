use crate::handler::TypeErrorHandler;
use crate::info::*;
use mtm_source::{Confidence, SourceLocation};
use mtm_syntax::{ExprKind, ExpressionNode, Literal, TypeInfo};

/// Object literals nested at least this deep get interface suggestions.
const DEEP_NESTING: usize = 3;

/// Name fragments that usually hold fractional values.
const FRACTIONAL_WORDS: &[&str] = &[
    "price", "rate", "ratio", "percent", "amount", "average", "avg", "weight", "scale", "factor", "cost",
    "balance", "opacity", "progress",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    EmptyArray,
    EmptyObject,
    Null,
    NestedObject,
    Other,
}

fn value_shape(value: &ExpressionNode) -> ValueShape {
    let value = value.unparenthesized();
    match &value.kind {
        ExprKind::Array(elements) if elements.is_empty() => ValueShape::EmptyArray,
        ExprKind::Object(properties) if properties.is_empty() => ValueShape::EmptyObject,
        ExprKind::Literal(Literal::Null) => ValueShape::Null,
        ExprKind::Object(_) if value.literal_depth() >= DEEP_NESTING => ValueShape::NestedObject,
        _ => ValueShape::Other,
    }
}

fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl TypeErrorHandler {
    /// Recovery plan for a variable whose type came out as `any`.
    pub fn handle_inference_failure(
        &self,
        variable_name: &str,
        raw_value: &ExpressionNode,
        location: SourceLocation,
    ) -> TypeErrorRecovery {
        log::trace!("Inference failed for ${} at {}", variable_name, location);
        let suggestions = match value_shape(raw_value) {
            ValueShape::EmptyArray => vec![
                format!("Declare the element type: '${}: Array<T> = []'", variable_name),
                format!("Or use the shorthand: '${}: T[] = []'", variable_name),
            ],
            ValueShape::EmptyObject => vec![
                format!(
                    "Describe the object shape with an interface, e.g. 'interface {} {{ ... }}'",
                    pascal_case(variable_name)
                ),
                format!("Or annotate it as a plain object: '${}: object = {{}}'", variable_name),
            ],
            ValueShape::Null => vec![
                format!("Use a nullable type: '${}: T | null = null'", variable_name),
                format!("Or the shorthand: '${}: T? = null'", variable_name),
            ],
            ValueShape::NestedObject => vec![
                format!(
                    "Extract the nested structure into a named interface such as '{}'",
                    pascal_case(variable_name)
                ),
                "Or use a string-keyed map type such as 'Record<string, T>'".to_string(),
            ],
            ValueShape::Other => vec![format!("Add an explicit type annotation: '${}: type = value'", variable_name)],
        };

        TypeErrorRecovery {
            fallback_type: TypeInfo::any(),
            requires_explicit_type: true,
            confidence: Confidence::Low,
            suggestions,
        }
    }

    /// One hint per ambiguous pattern in `value`. `context` is any
    /// surrounding text that helps guess intent, such as the declaration line.
    pub fn generate_type_hints(
        &self,
        variable_name: &str,
        value: &ExpressionNode,
        context: &str,
        location: SourceLocation,
    ) -> Vec<TypeHint> {
        let hint = |pattern, message: String, suggested_type: &str, confidence| TypeHint {
            variable_name: variable_name.to_string(),
            pattern,
            message,
            suggested_type: suggested_type.to_string(),
            confidence,
            location,
        };
        let mut hints = Vec::new();

        if let ExprKind::Literal(literal @ Literal::Number { raw, .. }) = &value.unparenthesized().kind {
            let haystack = format!("{} {}", variable_name, context).to_lowercase();
            if literal.is_integral() && FRACTIONAL_WORDS.iter().any(|word| haystack.contains(word)) {
                hints.push(hint(
                    HintPattern::AmbiguousNumber,
                    format!(
                        "'${}' looks like it holds decimals but '{}' infers 'number'; write '{}.0' or annotate it as 'float'",
                        variable_name, raw, raw
                    ),
                    "float",
                    Confidence::Medium,
                ));
            }
        }

        match value_shape(value) {
            ValueShape::EmptyArray => hints.push(hint(
                HintPattern::EmptyCollection,
                format!("'${}' starts as an empty array, so its element type is unknown", variable_name),
                "Array<T>",
                Confidence::Low,
            )),
            ValueShape::EmptyObject => hints.push(hint(
                HintPattern::EmptyCollection,
                format!("'${}' starts as an empty object, so its shape is unknown", variable_name),
                "object",
                Confidence::Low,
            )),
            ValueShape::Null => hints.push(hint(
                HintPattern::NullValue,
                format!("'${}' starts as null, so only its nullability is known", variable_name),
                "T | null",
                Confidence::Low,
            )),
            ValueShape::NestedObject | ValueShape::Other => {}
        }

        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtm_syntax::parse_expression;

    fn recovery(value: &str) -> TypeErrorRecovery {
        TypeErrorHandler::new().handle_inference_failure("items", &parse_expression(value).unwrap(), SourceLocation::START)
    }

    #[test]
    fn test_recovery_always_requires_explicit_type() {
        let recovery = recovery("[]");
        assert!(recovery.fallback_type.is_any());
        assert!(!recovery.fallback_type.nullable);
        assert!(recovery.requires_explicit_type);
        assert_eq!(recovery.confidence, Confidence::Low);
    }

    #[test]
    fn test_recovery_suggestions_follow_value_shape() {
        assert!(recovery("[]").suggestions[0].contains("Array<T>"));
        assert!(recovery("{}").suggestions[0].contains("interface Items"));
        assert!(recovery("null").suggestions[0].contains("T | null"));
        let nested = recovery("{ a: { b: { c: 1 } } }");
        assert!(nested.suggestions[0].contains("named interface"));
        assert!(nested.suggestions[1].contains("Record<string, T>"));
        assert_eq!(recovery("load()").suggestions.len(), 1);
    }

    #[test]
    fn test_hints() {
        let handler = TypeErrorHandler::new();
        let hints = |name: &str, value: &str| {
            handler.generate_type_hints(name, &parse_expression(value).unwrap(), "", SourceLocation::START)
        };

        let price = hints("price", "10");
        assert_eq!(price.len(), 1);
        assert_eq!(price[0].pattern, HintPattern::AmbiguousNumber);
        assert_eq!(price[0].suggested_type, "float");
        assert_eq!(price[0].confidence, Confidence::Medium);

        assert!(hints("count", "10").is_empty());
        assert!(hints("price", "10.5").is_empty());
        assert_eq!(hints("todos", "[]")[0].suggested_type, "Array<T>");
        assert_eq!(hints("user", "null")[0].pattern, HintPattern::NullValue);
        assert_eq!(hints("user", "null")[0].confidence, Confidence::Low);
    }
}
