use crate::dialect::{Dialect, Place};
use crate::emit::{normalize_lines, print_expression};
use crate::rewrite::rewrite_code;
use crate::symbols::Symbols;
use crate::TemplateOutput;
use mtm_syntax::{BindingType, DataBindingNode, TemplateNode};

/// Rewrites the bindings of `template` into the target's markup dialect.
///
/// Markup outside the bindings is copied unchanged; the result has its
/// blank edges and common indentation removed.
pub fn rewrite_template<D: Dialect + ?Sized>(template: &TemplateNode, dialect: &D, symbols: &Symbols) -> TemplateOutput {
    let content = template.content.as_str();
    let base = template.range.start.index;
    let mut bindings: Vec<&DataBindingNode> = template.bindings.iter().collect();
    bindings.sort_by_key(|binding| binding.range.start.index);

    let mut markup = String::with_capacity(content.len());
    let mut output = TemplateOutput::default();
    let mut cursor = 0;

    for binding in bindings {
        let (Some(start), Some(end)) = (
            binding.range.start.index.checked_sub(base),
            binding.range.end.index.checked_sub(base),
        ) else {
            continue;
        };
        if start < cursor || end > content.len() || start > end {
            continue;
        }
        let Some(replacement) = lower_binding(template, binding, dialect, symbols) else {
            continue;
        };
        markup.push_str(&content[cursor..start]);
        markup.push_str(&replacement);
        cursor = end;

        match binding.binding_type {
            BindingType::Event => {
                if !output.event_handlers.contains(&binding.source) {
                    output.event_handlers.push(binding.source.clone());
                }
            }
            BindingType::Variable | BindingType::Expression => output.bindings.push(binding.source.clone()),
        }
    }
    markup.push_str(&content[cursor..]);
    log::trace!(
        "Rewrote {} template bindings, {} event handlers",
        output.bindings.len(),
        output.event_handlers.len()
    );

    output.template = normalize_lines(&markup).join("\n");
    output
}

fn lower_binding<D: Dialect + ?Sized>(
    template: &TemplateNode,
    binding: &DataBindingNode,
    dialect: &D,
    symbols: &Symbols,
) -> Option<String> {
    match binding.binding_type {
        BindingType::Variable => {
            let source = format!("${}", binding.source);
            Some(dialect.interpolate(&rewrite_code(&source, dialect, symbols, Place::Markup).code))
        }
        BindingType::Expression => {
            let expression = template.expressions.get(binding.expression?)?;
            Some(dialect.interpolate(&print_expression(expression, dialect, symbols, Place::Markup)))
        }
        BindingType::Event => {
            let arguments = binding
                .arguments
                .as_deref()
                .map(|arguments| rewrite_code(arguments, dialect, symbols, Place::Markup).code);
            Some(dialect.event(&binding.target, &binding.source, arguments.as_deref()))
        }
    }
}
