use crate::dialect::{operand, Dialect, Place, Quote};
use crate::emit::{arrow_function, indent, join_sections, print_expression};
use crate::naming::pascal_case;
use crate::symbols::{StateShape, Symbols};
use crate::{GeneratedCode, TransformOptions, Transformer};
use mtm_source::Target;
use mtm_syntax::{AssignOp, Channel, FunctionDeclarationNode, ProgramNode, VariableDeclarationNode};
use std::collections::BTreeSet;

/// Single-file components using `<script setup>`.
///
/// Primitive state lives in `ref()`, read through `.value` in the script
/// and unwrapped in the template. Array and object state lives in
/// `reactive()`; assigning a new value replaces its contents in place.
#[derive(Debug, Clone, Default)]
pub struct VueTransformer {
    options: TransformOptions,
}

impl VueTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }
}

impl Dialect for VueTransformer {
    fn quote(&self) -> Quote {
        Quote::Single
    }

    fn read(&self, name: &str, shape: StateShape, place: Place) -> String {
        match (place, shape) {
            (Place::Script, StateShape::Value) => format!("{}.value", name),
            _ => name.to_string(),
        }
    }

    fn write(&self, name: &str, shape: StateShape, op: AssignOp, value: &str) -> String {
        let value = value.trim();
        let replacement = match op.binary() {
            Some(binary) if shape.is_collection() => format!("{} {} {}", name, binary.symbol(), operand(value)),
            _ => value.to_string(),
        };
        match shape {
            StateShape::Value => format!("{}.value {} {}", name, op.symbol(), value),
            StateShape::Array => format!("{}.splice(0, {}.length, ...{})", name, name, replacement),
            StateShape::Object => format!("Object.assign({}, {})", name, replacement),
        }
    }

    fn interpolate(&self, expression: &str) -> String {
        format!("{{{{ {} }}}}", expression)
    }

    fn event(&self, event: &str, handler: &str, arguments: Option<&str>) -> String {
        match arguments {
            Some(arguments) => format!("@{}=\"{}({})\"", event, handler, arguments),
            None => format!("@{}=\"{}\"", event, handler),
        }
    }
}

impl Transformer for VueTransformer {
    fn target(&self) -> Target {
        Target::Vue
    }

    fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn transform_reactive_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let init = print_expression(&node.initializer, self, symbols, Place::Script);
        let primitive = if StateShape::of(node).is_collection() { "reactive" } else { "ref" };
        format!("const {} = {}({});", node.name, primitive, init)
    }

    fn transform_dollar_function(&self, node: &FunctionDeclarationNode, symbols: &Symbols) -> String {
        format!("const {} = {};", node.name, arrow_function(node, self, symbols).code)
    }

    fn transform_derived(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let value = print_expression(&node.initializer, self, symbols, Place::Script);
        let sources: Vec<String> = node
            .dependencies
            .iter()
            .map(|dep| match symbols.state(dep) {
                Some(_) => dep.clone(),
                None => format!("() => {}", dep),
            })
            .collect();
        format!(
            "watch([{}], () => {{ {}; }});",
            sources.join(", "),
            self.write(&node.name, StateShape::of(node), AssignOp::Assign, &value)
        )
    }

    fn transform_channel(&self, channel: &Channel) -> String {
        let unsubscribe = format!("unsubscribe{}", pascal_case(&channel.event));
        [
            format!("let {} = () => {{}};", unsubscribe),
            "onMounted(() => {".to_string(),
            format!(
                "  {} = signals.on({}, {});",
                unsubscribe,
                self.quote().quote(&channel.event),
                channel.emit.trim_start_matches('$')
            ),
            "});".to_string(),
            format!("onUnmounted(() => {}());", unsubscribe),
        ]
        .join("\n")
    }

    fn framework_imports(&self, program: &ProgramNode) -> Vec<String> {
        let mut primitives = BTreeSet::new();
        for var in program.variables().filter(|var| var.is_reactive) {
            primitives.insert(if StateShape::of(var).is_collection() { "reactive" } else { "ref" });
            if var.is_derived() {
                primitives.insert("watch");
            }
        }
        if !program.frontmatter.channels.is_empty() {
            primitives.insert("onMounted");
            primitives.insert("onUnmounted");
        }
        if primitives.is_empty() {
            return Vec::new();
        }
        let primitives: Vec<&str> = primitives.into_iter().collect();
        vec![format!("import {{ {} }} from 'vue';", primitives.join(", "))]
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
        if let Some(template) = code.template.as_ref().filter(|template| !template.template.is_empty()) {
            blocks.push(format!("<template>\n{}\n</template>", indent(&template.template, 2)));
        }
        blocks.push(if script.is_empty() {
            "<script setup>\n</script>".to_string()
        } else {
            format!("<script setup>\n{}\n</script>", script)
        });
        format!("{}\n", blocks.join("\n\n"))
    }
}
