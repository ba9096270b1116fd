use crate::handler::TypeErrorHandler;
use crate::info::*;
use mtm_source::Severity;
use mtm_syntax::{ProgramNode, VariableDeclarationNode};

impl TypeErrorHandler {
    /// Runs every per-declaration and program-wide check over a parsed
    /// component, in declaration order.
    pub fn check_program(&self, program: &ProgramNode) -> Vec<TypeErrorInfo> {
        let mut diagnostics = Vec::new();

        for var in program.variables() {
            diagnostics.extend(self.check_declaration(var));
        }

        let typed: Vec<_> = program
            .variables()
            .map(|var| TypedVariable {
                name: &var.name,
                type_info: var.effective_type(),
                location: var.name_range.start,
            })
            .collect();
        diagnostics.extend(self.check_type_consistency(&typed));

        for diagnostic in &diagnostics {
            match diagnostic.severity {
                Severity::Error | Severity::Warning => log::warn!("{}", diagnostic),
                Severity::Info => log::debug!("{}", diagnostic),
            }
        }
        diagnostics
    }

    fn check_declaration(&self, var: &VariableDeclarationNode) -> Vec<TypeErrorInfo> {
        let location = var.name_range.start;
        let mut diagnostics = Vec::new();

        match &var.type_annotation {
            Some(annotation) => {
                let inferred = var.inferred_type;
                if annotation.type_info.base_type != inferred.base_type && !is_null_for_nullable(var) {
                    diagnostics.push(self.handle_type_conflict(annotation, inferred, &var.name, location));
                }
            }
            None if var.inferred_type.is_any() => {
                let recovery = self.handle_inference_failure(&var.name, &var.initializer, location);
                let mut info = TypeErrorInfo::new(
                    TypeErrorKind::InferenceFailure,
                    Severity::Info,
                    format!("Could not infer a type for '${}', falling back to '{}'", var.name, recovery.fallback_type),
                    location,
                );
                info.variable_name = Some(var.name.clone());
                info.inferred = Some(recovery.fallback_type);
                info.suggestions = recovery.suggestions;
                diagnostics.push(info);
            }
            None => {}
        }

        if var.is_reactive {
            diagnostics.extend(self.validate_reactive_variable_type(&var.name, var.effective_type(), location));
        }
        diagnostics
    }
}

/// `$user: object? = null` is not a conflict.
fn is_null_for_nullable(var: &VariableDeclarationNode) -> bool {
    var.initializer.unparenthesized().is_null()
        && var
            .type_annotation
            .as_ref()
            .map_or(false, |annotation| annotation.type_info.nullable)
}
