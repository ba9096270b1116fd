use crate::info::*;
use mtm_source::{LineIndex, QuickFix, Severity, SourceLocation, SourceRange};
use mtm_syntax::{BaseType, TypeAnnotationNode, TypeInfo};
use once_cell::sync::Lazy;
use regex::Regex;

/// `$name[!][: type] = value[;]` on a single line; group 1 is the value.
static DECLARATION_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\$[A-Za-z_]\w*!?\s*(?::[^=]*)?=\s*(.*?)\s*;?\s*$").expect("Invalid declaration value regex pattern")
});

/// Number of `any`-typed variables that triggers the missing annotation note.
const ANY_TYPED_THRESHOLD: usize = 4;

/// Severity of a mismatch between an annotation and the inferred type.
pub fn conflict_severity(declared: BaseType, inferred: BaseType) -> Severity {
    if declared == inferred {
        Severity::Info
    } else if declared.is_numeric() && inferred.is_numeric() {
        Severity::Warning
    } else if declared == BaseType::Any || inferred == BaseType::Any {
        Severity::Info
    } else {
        Severity::Error
    }
}

/// Detects and explains type problems in modern-syntax declarations.
///
/// Quick fixes that rewrite values need the original text; handlers made
/// with [`TypeErrorHandler::new`] only offer fixes whose ranges are known
/// from the AST.
#[derive(Debug, Clone, Default)]
pub struct TypeErrorHandler {
    source: Option<String>,
}

impl TypeErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn handle_type_conflict(
        &self,
        declared: &TypeAnnotationNode,
        inferred: TypeInfo,
        variable_name: &str,
        location: SourceLocation,
    ) -> TypeErrorInfo {
        let declared_type = declared.type_info;
        let (decl, inf) = (declared_type.base_type, inferred.base_type);
        let severity = conflict_severity(decl, inf);
        if decl == inf {
            let message = format!("'${}' is declared '{}' and its value agrees", variable_name, declared_type);
            return TypeErrorInfo {
                variable_name: Some(variable_name.to_string()),
                declared: Some(declared_type),
                inferred: Some(inferred),
                ..TypeErrorInfo::new(TypeErrorKind::TypeConflict, severity, message, location)
            };
        }

        let (message, mut suggestions) = match severity {
            Severity::Warning => (
                format!(
                    "Numeric type mismatch for '${}': declared '{}' but the value is '{}'",
                    variable_name, declared_type, inferred
                ),
                vec!["Use 'float' as the type annotation for decimal precision".to_string()],
            ),
            Severity::Info => (
                format!(
                    "Ambiguous type for '${}': declared '{}', inferred '{}'",
                    variable_name, declared_type, inferred
                ),
                vec!["The explicit annotation is kept because the value does not determine a type".to_string()],
            ),
            Severity::Error => (
                format!(
                    "Type mismatch for '${}': declared '{}' but the value is '{}'",
                    variable_name, declared_type, inferred
                ),
                vec![format!("Change the type annotation to '{}'", inferred)],
            ),
        };
        suggestions.push("Remove the type annotation to use the inferred type".to_string());

        let mut quick_fixes = Vec::new();
        let replacement = if decl.is_numeric() && inf.is_numeric() {
            (decl != BaseType::Float).then(|| BaseType::Float.to_string())
        } else {
            (!inferred.is_any()).then(|| inferred.to_string())
        };
        if let Some(replacement) = replacement {
            quick_fixes.push(QuickFix::new(
                format!("Change type annotation to '{}'", replacement),
                replacement,
                declared.range,
            ));
        }
        quick_fixes.push(QuickFix::new("Remove type annotation", "", declared.annotation_range));

        if decl == BaseType::String && inf != BaseType::String && !inferred.is_any() {
            suggestions.push("Wrap the value in quotes to make it a string".to_string());
            if let Some((range, value)) = self.declaration_value(location) {
                quick_fixes.push(QuickFix::new(
                    "Wrap value in quotes",
                    format!("\"{}\"", value.replace('"', "\\\"")),
                    range,
                ));
            }
        }

        TypeErrorInfo {
            variable_name: Some(variable_name.to_string()),
            declared: Some(declared_type),
            inferred: Some(inferred),
            suggestions,
            quick_fixes,
            ..TypeErrorInfo::new(TypeErrorKind::TypeConflict, severity, message, location)
        }
    }

    /// Decides which type a conflicting declaration ends up with.
    pub fn resolve_type_conflict(&self, declared: TypeInfo, inferred: TypeInfo) -> ConflictResolution {
        let (decl, inf) = (declared.base_type, inferred.base_type);
        if decl == inf {
            return ConflictResolution {
                resolution: Resolution::UseExplicit,
                resolved_type: Some(declared),
                explanation: format!("Declared and inferred types agree on '{}'", declared),
                suggestions: Vec::new(),
            };
        }
        if decl.is_numeric() && inf.is_numeric() {
            return ConflictResolution {
                resolution: Resolution::UseExplicit,
                resolved_type: Some(declared),
                explanation: format!("'{}' and '{}' are compatible numeric types, the annotation wins", decl, inf),
                suggestions: vec!["Use 'float' when the value can hold decimals".to_string()],
            };
        }
        if inferred.is_any() || declared.is_any() {
            return ConflictResolution {
                resolution: Resolution::UseExplicit,
                resolved_type: Some(declared),
                explanation: "The value is ambiguous, the annotation resolves it".to_string(),
                suggestions: Vec::new(),
            };
        }
        ConflictResolution {
            resolution: Resolution::RequireClarification,
            resolved_type: None,
            explanation: format!("Declared type '{}' is incompatible with the value's type '{}'", declared, inferred),
            suggestions: vec![
                format!("Change the type annotation to '{}'", inferred),
                "Remove the type annotation and let the type be inferred".to_string(),
                format!("Change the value so it matches '{}'", declared),
            ],
        }
    }

    /// Reactive variables holding functions are almost always a mistake;
    /// `location` must point at the `$` of the declaration.
    pub fn validate_reactive_variable_type(
        &self,
        name: &str,
        type_info: TypeInfo,
        location: SourceLocation,
    ) -> Option<TypeErrorInfo> {
        if type_info.base_type != BaseType::Function {
            return None;
        }

        let mut info = TypeErrorInfo::new(
            TypeErrorKind::InvalidReactiveType,
            Severity::Warning,
            format!("Reactive variable '${}' holds a function", name),
            location,
        );
        info.variable_name = Some(name.to_string());
        info.inferred = Some(type_info);
        info.suggestions = vec![
            format!("Declare it as a function: '${} = (params) => {{ ... }}'", name),
            "Reactive state should hold data, not callbacks".to_string(),
        ];
        if let Some(range) = self.reactive_suffix_range(name, location) {
            info.quick_fixes
                .push(QuickFix::new("Remove reactive suffix (!)", "", range));
        }
        Some(info)
    }

    /// Program-wide checks: mixed `number`/`float` variables, and too many
    /// variables left as `any`.
    pub fn check_type_consistency(&self, variables: &[TypedVariable<'_>]) -> Vec<TypeErrorInfo> {
        let mut diagnostics = Vec::new();

        let integral: Vec<_> = variables
            .iter()
            .filter(|var| var.type_info.base_type == BaseType::Number)
            .collect();
        let fractional: Vec<_> = variables
            .iter()
            .filter(|var| var.type_info.base_type == BaseType::Float)
            .collect();
        if let (Some(first), false) = (integral.first(), fractional.is_empty()) {
            let names = |vars: &[&TypedVariable<'_>]| {
                vars.iter().map(|var| format!("${}", var.name)).collect::<Vec<_>>().join(", ")
            };
            let mut info = TypeErrorInfo::new(
                TypeErrorKind::TypeConflict,
                Severity::Warning,
                format!(
                    "Mixed numeric types: {} are 'number' while {} are 'float'",
                    names(&integral),
                    names(&fractional)
                ),
                first.location,
            );
            info.suggestions =
                vec!["Use 'float' consistently for values that take part in the same calculations".to_string()];
            diagnostics.push(info);
        }

        let untyped: Vec<_> = variables.iter().filter(|var| var.type_info.is_any()).collect();
        if untyped.len() >= ANY_TYPED_THRESHOLD {
            let mut info = TypeErrorInfo::new(
                TypeErrorKind::MissingTypeAnnotation,
                Severity::Info,
                format!("{} variables have no inferable type", untyped.len()),
                untyped[0].location,
            );
            info.suggestions = vec!["Add explicit type annotations, e.g. '$name: string = value'".to_string()];
            diagnostics.push(info);
        }

        diagnostics
    }

    /// Range and text of the value on the declaration line at `location`.
    fn declaration_value(&self, location: SourceLocation) -> Option<(SourceRange, &str)> {
        let source = self.source.as_deref()?;
        let index = LineIndex::new(source);
        let line = index.line_text(location.line)?;
        let value = DECLARATION_VALUE.captures(line)?.get(1)?;
        if value.as_str().is_empty() {
            return None;
        }
        let line_start = index.index_of(location.line, 1);
        let range = index.range(line_start + value.start(), line_start + value.end());
        Some((range, value.as_str()))
    }

    fn reactive_suffix_range(&self, name: &str, location: SourceLocation) -> Option<SourceRange> {
        let offset = 1 + name.len();
        let start = SourceLocation::new(location.line, location.column + name.chars().count() + 1, location.index + offset);
        if let Some(source) = self.source.as_deref() {
            if source.get(start.index..start.index + 1) != Some("!") {
                return None;
            }
        }
        let end = SourceLocation::new(start.line, start.column + 1, start.index + 1);
        Some(SourceRange::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtm_syntax::{parse, Statement, UnifiedAst, VariableDeclarationNode};

    fn declaration(source: &str) -> VariableDeclarationNode {
        let UnifiedAst::Program(program) = parse(source).unwrap() else {
            panic!("expected modern program");
        };
        match program.body.into_iter().next() {
            Some(Statement::Variable(var) | Statement::ReactiveVariable(var)) => var,
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    fn conflict(source: &str) -> TypeErrorInfo {
        let var = declaration(source);
        TypeErrorHandler::with_source(source).handle_type_conflict(
            var.type_annotation.as_ref().unwrap(),
            var.inferred_type,
            &var.name,
            var.name_range.start,
        )
    }

    #[test]
    fn test_severity_table() {
        assert_eq!(conflict_severity(BaseType::Number, BaseType::Float), Severity::Warning);
        assert_eq!(conflict_severity(BaseType::Float, BaseType::Number), Severity::Warning);
        assert_eq!(conflict_severity(BaseType::String, BaseType::Any), Severity::Info);
        assert_eq!(conflict_severity(BaseType::Any, BaseType::Boolean), Severity::Info);
        assert_eq!(conflict_severity(BaseType::String, BaseType::Number), Severity::Error);
        assert_eq!(conflict_severity(BaseType::Boolean, BaseType::String), Severity::Error);
        assert_eq!(conflict_severity(BaseType::Number, BaseType::Number), Severity::Info);
        assert_eq!(conflict_severity(BaseType::String, BaseType::String), Severity::Info);
    }

    #[test]
    fn test_matching_types_are_not_a_conflict() {
        let info = conflict("$title: string = \"Home\"\n");
        assert_eq!(info.severity, Severity::Info);
        assert!(!info.message.contains("mismatch"));
        assert!(info.quick_fixes.is_empty());
        assert!(info.suggestions.is_empty());

        let info = conflict("$count: number = 3\n");
        assert_eq!(info.severity, Severity::Info);
        assert!(info.quick_fixes.is_empty());
    }

    #[test]
    fn test_string_conflict_offers_three_fixes() {
        let source = "$title: string = 42\n";
        let info = conflict(source);
        assert_eq!(info.severity, Severity::Error);
        assert_eq!(info.kind, TypeErrorKind::TypeConflict);

        let fixed: Vec<_> = info.quick_fixes.iter().map(|fix| fix.apply(source).unwrap()).collect();
        assert_eq!(
            fixed,
            vec![
                "$title: number = 42\n".to_string(),
                "$title = 42\n".to_string(),
                "$title: string = \"42\"\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_numeric_conflict_aligns_to_float() {
        let source = "$price: number = 9.99";
        let info = conflict(source);
        assert_eq!(info.severity, Severity::Warning);
        assert_eq!(info.quick_fixes[0].apply(source).as_deref(), Some("$price: float = 9.99"));
        assert!(info.suggestions[0].contains("decimal precision"));
    }

    #[test]
    fn test_any_conflict_is_informational() {
        let info = conflict("$data: object = fetchData()");
        assert_eq!(info.severity, Severity::Info);
        assert_eq!(info.quick_fixes.len(), 1);
    }

    #[test]
    fn test_resolution_table() {
        let handler = TypeErrorHandler::new();
        let number = TypeInfo::new(BaseType::Number);
        let float = TypeInfo::new(BaseType::Float);
        let string = TypeInfo::new(BaseType::String);

        let numeric = handler.resolve_type_conflict(number, float);
        assert_eq!(numeric.resolution, Resolution::UseExplicit);
        assert_eq!(numeric.resolved_type, Some(number));

        let ambiguous = handler.resolve_type_conflict(string, TypeInfo::any());
        assert_eq!(ambiguous.resolution, Resolution::UseExplicit);

        let incompatible = handler.resolve_type_conflict(string, number);
        assert_eq!(incompatible.resolution, Resolution::RequireClarification);
        assert_eq!(incompatible.resolved_type, None);
        assert_eq!(incompatible.suggestions.len(), 3);
    }

    #[test]
    fn test_reactive_function_is_rejected() {
        let source = "$onSave! = () => save()";
        let var = declaration(source);
        let handler = TypeErrorHandler::with_source(source);
        let info = handler
            .validate_reactive_variable_type(&var.name, var.inferred_type, var.name_range.start)
            .unwrap();
        assert_eq!(info.severity, Severity::Warning);
        assert_eq!(info.quick_fixes[0].apply(source).as_deref(), Some("$onSave = () => save()"));
    }

    #[test]
    fn test_reactive_data_is_accepted() {
        let handler = TypeErrorHandler::new();
        for base_type in BaseType::ALL.into_iter().filter(|ty| *ty != BaseType::Function) {
            let result = handler.validate_reactive_variable_type("x", TypeInfo::new(base_type), SourceLocation::START);
            assert!(result.is_none(), "{} should be accepted", base_type);
        }
    }

    fn typed(types: &[BaseType]) -> Vec<TypedVariable<'static>> {
        types
            .iter()
            .map(|base_type| TypedVariable {
                name: "v",
                type_info: TypeInfo::new(*base_type),
                location: SourceLocation::START,
            })
            .collect()
    }

    #[test]
    fn test_consistency_thresholds() {
        let handler = TypeErrorHandler::new();

        let three_any = handler.check_type_consistency(&typed(&[BaseType::Any; 3]));
        assert!(three_any.is_empty());

        let four_any = handler.check_type_consistency(&typed(&[BaseType::Any; 4]));
        assert_eq!(four_any.len(), 1);
        assert_eq!(four_any[0].kind, TypeErrorKind::MissingTypeAnnotation);
        assert_eq!(four_any[0].severity, Severity::Info);

        let mixed = handler.check_type_consistency(&typed(&[BaseType::Number, BaseType::Float]));
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].kind, TypeErrorKind::TypeConflict);
        assert_eq!(mixed[0].severity, Severity::Warning);

        assert!(handler.check_type_consistency(&typed(&[BaseType::Number, BaseType::Number])).is_empty());
    }
}
