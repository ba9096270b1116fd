use crate::dialect::{Dialect, Place, Quote};
use crate::emit::{arrow_function, print_expression};
use crate::jsx;
use crate::naming::setter_name;
use crate::symbols::{StateShape, Symbols};
use crate::template::rewrite_template;
use crate::{GeneratedCode, TemplateOutput, TransformOptions, Transformer};
use mtm_source::Target;
use mtm_syntax::{AssignOp, Channel, FunctionDeclarationNode, ProgramNode, TemplateNode, VariableDeclarationNode};
use std::collections::BTreeSet;

/// Signal-based components; state is read by calling its accessor.
#[derive(Debug, Clone, Default)]
pub struct SolidTransformer {
    options: TransformOptions,
}

impl SolidTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }
}

impl Dialect for SolidTransformer {
    fn quote(&self) -> Quote {
        Quote::Double
    }

    fn read(&self, name: &str, _shape: StateShape, _place: Place) -> String {
        format!("{}()", name)
    }

    fn write(&self, name: &str, _shape: StateShape, op: AssignOp, value: &str) -> String {
        jsx::setter_call(name, op, value)
    }

    fn interpolate(&self, expression: &str) -> String {
        format!("{{{}}}", expression)
    }

    fn event(&self, event: &str, handler: &str, arguments: Option<&str>) -> String {
        jsx::event_attribute(event, handler, arguments)
    }
}

impl Transformer for SolidTransformer {
    fn target(&self) -> Target {
        Target::Solid
    }

    fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn transform_reactive_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let init = print_expression(&node.initializer, self, symbols, Place::Script);
        format!("const [{}, {}] = createSignal({});", node.name, setter_name(&node.name), init)
    }

    fn transform_dollar_function(&self, node: &FunctionDeclarationNode, symbols: &Symbols) -> String {
        format!("const {} = {};", node.name, arrow_function(node, self, symbols).code)
    }

    fn transform_template(&self, node: &TemplateNode, symbols: &Symbols) -> TemplateOutput {
        let mut output = rewrite_template(node, self, symbols);
        output.template = jsx::close_void_elements(&output.template);
        output
    }

    fn transform_derived(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let value = print_expression(&node.initializer, self, symbols, Place::Script);
        format!("createEffect(() => {});", jsx::setter_call(&node.name, AssignOp::Assign, &value))
    }

    fn transform_channel(&self, channel: &Channel) -> String {
        format!(
            "createEffect(() => onCleanup(signals.on({}, {})));",
            self.quote().quote(&channel.event),
            channel.emit.trim_start_matches('$')
        )
    }

    fn framework_imports(&self, program: &ProgramNode) -> Vec<String> {
        let channels = !program.frontmatter.channels.is_empty();
        let mut primitives = BTreeSet::new();
        if program.variables().any(|var| var.is_reactive) {
            primitives.insert("createSignal");
        }
        if channels || program.variables().any(|var| var.is_derived()) {
            primitives.insert("createEffect");
        }
        if channels {
            primitives.insert("onCleanup");
        }
        if primitives.is_empty() {
            return Vec::new();
        }
        let primitives: Vec<&str> = primitives.into_iter().collect();
        vec![format!("import {{ {} }} from \"solid-js\";", primitives.join(", "))]
    }

    fn compose(&self, name: &str, code: &GeneratedCode) -> String {
        jsx::function_component(name, code)
    }
}
