use crate::dialect::{Dialect, Place, Quote};
use crate::emit::{arrow_function, print_expression};
use crate::jsx;
use crate::naming::setter_name;
use crate::symbols::{StateShape, Symbols};
use crate::template::rewrite_template;
use crate::{GeneratedCode, TemplateOutput, TransformOptions, Transformer};
use mtm_source::Target;
use mtm_syntax::{
    AssignOp, Channel, ExprKind, FunctionDeclarationNode, ProgramNode, TemplateNode, VariableDeclarationNode,
};
use std::collections::BTreeSet;

/// Hooks-based function components.
#[derive(Debug, Clone, Default)]
pub struct ReactTransformer {
    options: TransformOptions,
}

impl ReactTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }
}

impl Dialect for ReactTransformer {
    fn quote(&self) -> Quote {
        Quote::Double
    }

    fn read(&self, name: &str, _shape: StateShape, _place: Place) -> String {
        name.to_string()
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

impl Transformer for ReactTransformer {
    fn target(&self) -> Target {
        Target::React
    }

    fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn transform_reactive_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let mut init = print_expression(&node.initializer, self, symbols, Place::Script);
        // useState calls a function argument to get the initial value
        if matches!(node.initializer.unparenthesized().kind, ExprKind::ArrowFunction { .. }) {
            init = format!("() => {}", init);
        }
        format!("const [{}, {}] = useState({});", node.name, setter_name(&node.name), init)
    }

    fn transform_dollar_function(&self, node: &FunctionDeclarationNode, symbols: &Symbols) -> String {
        let function = arrow_function(node, self, symbols);
        format!(
            "const {} = useCallback({}, [{}]);",
            node.name,
            function.code,
            function.reads.join(", ")
        )
    }

    fn transform_template(&self, node: &TemplateNode, symbols: &Symbols) -> TemplateOutput {
        let mut output = rewrite_template(node, self, symbols);
        output.template = jsx::react_attributes(&jsx::close_void_elements(&output.template));
        output
    }

    fn transform_derived(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let value = print_expression(&node.initializer, self, symbols, Place::Script);
        format!(
            "useEffect(() => {{ {}; }}, [{}]);",
            jsx::setter_call(&node.name, AssignOp::Assign, &value),
            node.dependencies.join(", ")
        )
    }

    fn transform_channel(&self, channel: &Channel) -> String {
        format!(
            "useEffect(() => signals.on({}, {}), []);",
            self.quote().quote(&channel.event),
            channel.emit.trim_start_matches('$')
        )
    }

    fn framework_imports(&self, program: &ProgramNode) -> Vec<String> {
        let mut hooks = BTreeSet::new();
        if program.variables().any(|var| var.is_reactive) {
            hooks.insert("useState");
        }
        if program.functions().next().is_some() {
            hooks.insert("useCallback");
        }
        if program.variables().any(|var| var.is_derived()) || !program.frontmatter.channels.is_empty() {
            hooks.insert("useEffect");
        }
        if hooks.is_empty() {
            return Vec::new();
        }
        let hooks: Vec<&str> = hooks.into_iter().collect();
        vec![format!("import {{ {} }} from \"react\";", hooks.join(", "))]
    }

    fn compose(&self, name: &str, code: &GeneratedCode) -> String {
        jsx::function_component(name, code)
    }
}
