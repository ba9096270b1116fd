//! Post-parse analysis: inferred types, dependencies, update triggers,
//! binding reactivity and the feature record.

use crate::ast::*;
use crate::infer::TypeInferrer;
use crate::lexer::lex_lenient;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) fn analyze(program: &mut ProgramNode) {
    let mut inferrer = TypeInferrer::new();
    for func in program.functions() {
        inferrer.declare(func.name.clone(), TypeInfo::new(BaseType::Function));
    }

    let declared: FxHashSet<String> = program.variables().map(|var| var.name.clone()).collect();
    let triggers = assignment_triggers(program);

    for statement in &mut program.body {
        let (Statement::Variable(var) | Statement::ReactiveVariable(var)) = statement else {
            continue;
        };
        var.inferred_type = inferrer.infer(&var.initializer).type_info;
        inferrer.declare(var.name.clone(), var.effective_type());

        let dependencies: IndexSet<&str> = var
            .initializer
            .dollar_references()
            .into_iter()
            .filter(|name| *name != var.name && declared.contains(*name))
            .collect();
        var.dependencies = dependencies.into_iter().map(str::to_string).collect();
        var.update_triggers = triggers.get(var.name.as_str()).cloned().unwrap_or_default();
        log::trace!(
            "${}: {} depends on {:?}, updated by {:?}",
            var.name,
            var.inferred_type,
            var.dependencies,
            var.update_triggers
        );
    }

    let reactive: FxHashSet<String> = program
        .variables()
        .filter(|var| var.is_reactive)
        .map(|var| var.name.clone())
        .collect();
    for statement in &mut program.body {
        if let Statement::Template(template) = statement {
            mark_bindings(template, &reactive);
        }
    }

    let features = &mut program.modern_features;
    features.dollar_prefix_variables = program.body.iter().any(|statement| match statement {
        Statement::Variable(var) | Statement::ReactiveVariable(var) => var.has_dollar_prefix,
        Statement::Function(func) => func.has_dollar_prefix,
        _ => false,
    });
    let mut variables = program.body.iter().filter_map(|statement| match statement {
        Statement::Variable(var) | Statement::ReactiveVariable(var) => Some(var),
        _ => None,
    });
    features.reactive_variables = variables.clone().any(|var| var.is_reactive);
    features.enhanced_type_inference =
        variables.any(|var| var.type_annotation.is_none() && !var.inferred_type.is_any());
    features.auto_this_binding = program.body.iter().any(|statement| match statement {
        Statement::Function(func) => func.auto_bind_this,
        _ => false,
    });
}

/// Maps each variable name to the functions whose bodies assign it.
fn assignment_triggers(program: &ProgramNode) -> FxHashMap<String, Vec<String>> {
    let mut triggers: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for func in program.functions() {
        for name in assigned_names(&func.body.source) {
            if program.variable(&name).is_none() {
                continue;
            }
            let entry = triggers.entry(name).or_default();
            if !entry.contains(&func.name) {
                entry.push(func.name.clone());
            }
        }
    }
    triggers
}

/// `$name` identifiers a body assigns with `=`, a compound assignment, or
/// `++`/`--`, in first-assignment order.
pub fn assigned_names(body: &str) -> Vec<String> {
    let tokens = lex_lenient(body);
    let mut names: IndexSet<String> = IndexSet::new();
    for (idx, tok) in tokens.iter().enumerate() {
        let Some(name) = tok.dollar_name() else {
            continue;
        };
        let next = tokens.get(idx + 1).map(|next| next.kind);
        let prev = idx.checked_sub(1).and_then(|prev| tokens.get(prev)).map(|prev| prev.kind);
        let assigned = next.map_or(false, |kind| kind.is_assignment() || kind.is_update())
            || prev.map_or(false, |kind| kind.is_update());
        if assigned {
            names.insert(name.to_string());
        }
    }
    names.into_iter().collect()
}

fn mark_bindings(template: &mut TemplateNode, reactive: &FxHashSet<String>) {
    for binding in &mut template.bindings {
        binding.is_reactive = match binding.binding_type {
            BindingType::Variable => reactive.contains(&binding.source),
            BindingType::Expression => binding
                .expression
                .and_then(|idx| template.expressions.get(idx))
                .map_or(false, |expr| expr.dollar_references().iter().any(|name| reactive.contains(*name))),
            BindingType::Event => false,
        };
        binding.update_strategy = match binding.binding_type {
            BindingType::Event => UpdateStrategy::Immediate,
            _ if binding.is_reactive => UpdateStrategy::Immediate,
            _ => UpdateStrategy::Static,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn program(source: &str) -> ProgramNode {
        match parse(source).unwrap() {
            UnifiedAst::Program(program) => program,
            other => panic!("expected modern program, got {:?}", other),
        }
    }

    const COUNTER: &str = r#"$count! = 0
$step = 2
$label: string = "Clicks"
$doubled! = $count * $step + $count
$increment = () => {
  $count += $step
}
$reset = () => { $count = 0; $label = "Reset" }
<template>
  <p>{{$label}}: {{$count}} ({{ $doubled / 2 }})</p>
  <button click="$increment()">+</button>
</template>
"#;

    #[test]
    fn test_inferred_types() {
        let program = program(COUNTER);
        assert_eq!(program.variable("count").unwrap().inferred_type, TypeInfo::new(BaseType::Number));
        assert_eq!(program.variable("doubled").unwrap().inferred_type, TypeInfo::new(BaseType::Number));
        assert_eq!(program.variable("label").unwrap().inferred_type, TypeInfo::new(BaseType::String));
    }

    #[test]
    fn test_dependencies_are_ordered_and_unique() {
        let program = program(COUNTER);
        assert_eq!(program.variable("doubled").unwrap().dependencies, vec!["count", "step"]);
        assert!(program.variable("count").unwrap().dependencies.is_empty());
    }

    #[test]
    fn test_update_triggers() {
        let program = program(COUNTER);
        assert_eq!(program.variable("count").unwrap().update_triggers, vec!["increment", "reset"]);
        assert_eq!(program.variable("label").unwrap().update_triggers, vec!["reset"]);
        assert!(program.variable("step").unwrap().update_triggers.is_empty());
    }

    #[test]
    fn test_binding_reactivity() {
        let program = program(COUNTER);
        let template = program.template().unwrap();
        let flags: Vec<_> = template
            .bindings
            .iter()
            .map(|binding| (binding.source.as_str(), binding.is_reactive, binding.update_strategy))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("label", false, UpdateStrategy::Static),
                ("count", true, UpdateStrategy::Immediate),
                ("$doubled / 2", true, UpdateStrategy::Immediate),
                ("increment", false, UpdateStrategy::Immediate),
            ]
        );
    }

    #[test]
    fn test_modern_features() {
        let features = program(COUNTER).modern_features;
        assert!(features.dollar_prefix_variables);
        assert!(features.reactive_variables);
        assert!(features.enhanced_type_inference);
        assert!(features.optional_semicolons);
        assert!(features.auto_this_binding);
    }

    #[test]
    fn test_assigned_names() {
        assert_eq!(assigned_names("$a++; --$b; $c = $d; if ($e == 1) {}"), vec!["a", "b", "c"]);
    }
}
