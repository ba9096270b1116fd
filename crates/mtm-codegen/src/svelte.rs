use crate::dialect::{updater, Dialect, Place, Quote};
use crate::emit::{braced, indent, join_sections, parameter_list, print_expression};
use crate::rewrite::rewrite_code;
use crate::symbols::{StateShape, Symbols};
use crate::{GeneratedCode, TransformOptions, Transformer};
use mtm_source::Target;
use mtm_syntax::{AssignOp, Channel, FunctionDeclarationNode, ProgramNode, VariableDeclarationNode};

/// Components whose reactive state lives in writable stores, read with the
/// `$store` auto-subscription both in the script and in markup.
#[derive(Debug, Clone, Default)]
pub struct SvelteTransformer {
    options: TransformOptions,
}

impl SvelteTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }
}

impl Dialect for SvelteTransformer {
    fn quote(&self) -> Quote {
        Quote::Single
    }

    fn read(&self, name: &str, _shape: StateShape, _place: Place) -> String {
        format!("${}", name)
    }

    fn write(&self, name: &str, _shape: StateShape, op: AssignOp, value: &str) -> String {
        match updater(op, value) {
            Some(update) => format!("{}.update({})", name, update),
            None => format!("{}.set({})", name, value.trim()),
        }
    }

    fn interpolate(&self, expression: &str) -> String {
        format!("{{{}}}", expression)
    }

    fn event(&self, event: &str, handler: &str, arguments: Option<&str>) -> String {
        match arguments {
            Some(arguments) => format!("on:{}={{() => {}({})}}", event, handler, arguments),
            None => format!("on:{}={{{}}}", event, handler),
        }
    }
}

impl Transformer for SvelteTransformer {
    fn target(&self) -> Target {
        Target::Svelte
    }

    fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn transform_reactive_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let init = print_expression(&node.initializer, self, symbols, Place::Script);
        format!("const {} = writable({});", node.name, init)
    }

    /// Functions become named `function` declarations.
    fn transform_dollar_function(&self, node: &FunctionDeclarationNode, symbols: &Symbols) -> String {
        let body = rewrite_code(&node.body.source, self, symbols, Place::Script).code;
        let body = if node.body.is_expression {
            braced(&format!("return {};", body.trim()))
        } else {
            braced(&body)
        };
        format!(
            "{}function {}{} {}",
            if node.is_async { "async " } else { "" },
            node.name,
            parameter_list(&node.parameters),
            body
        )
    }

    fn transform_derived(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let value = print_expression(&node.initializer, self, symbols, Place::Script);
        format!("$: {};", self.write(&node.name, StateShape::of(node), AssignOp::Assign, &value))
    }

    fn transform_channel(&self, channel: &Channel) -> String {
        format!(
            "onMount(() => signals.on({}, {}));",
            self.quote().quote(&channel.event),
            channel.emit.trim_start_matches('$')
        )
    }

    fn framework_imports(&self, program: &ProgramNode) -> Vec<String> {
        let mut imports = Vec::new();
        if !program.frontmatter.channels.is_empty() {
            imports.push("import { onMount } from 'svelte';".to_string());
        }
        if program.variables().any(|var| var.is_reactive) {
            imports.push("import { writable } from 'svelte/store';".to_string());
        }
        imports
    }

    fn compose(&self, _name: &str, code: &GeneratedCode) -> String {
        let script = join_sections([
            code.imports.join("\n"),
            code.state.join("\n"),
            code.functions.join("\n\n"),
            code.effects.join("\n"),
            code.statements.join("\n"),
        ]);
        let mut blocks = Vec::new();
        if !script.is_empty() {
            blocks.push(format!("<script>\n{}\n</script>", indent(&script, 2)));
        }
        if let Some(template) = code.template.as_ref().filter(|template| !template.template.is_empty()) {
            blocks.push(template.template.clone());
        }
        format!("{}\n", blocks.join("\n\n"))
    }
}
