use crate::dialect::{Dialect, Place};
use crate::emit::print_expression;
use crate::naming::component_name;
use crate::symbols::Symbols;
use crate::template::rewrite_template;
use mtm_source::Target;
use mtm_syntax::{
    Channel, FunctionDeclarationNode, ProgramNode, Statement, TemplateNode, UnifiedAst, VariableDeclarationNode,
};
use serde::Serialize;

pub const DEFAULT_RUNTIME_MODULE: &str = "@mtm/runtime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// File stem the component name falls back to
    pub file_stem: Option<String>,
    /// Module `signals` is imported from for channel subscriptions
    pub runtime_module: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            file_stem: None,
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
        }
    }
}

/// Markup in the target dialect, with what it binds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TemplateOutput {
    pub template: String,
    /// Interpolated variables and expressions, as written
    pub bindings: Vec<String>,
    /// Handler functions referenced by event attributes
    pub event_handlers: Vec<String>,
}

/// Everything generated for one component, by kind, plus the composed
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GeneratedCode {
    pub imports: Vec<String>,
    pub state: Vec<String>,
    pub functions: Vec<String>,
    pub effects: Vec<String>,
    pub statements: Vec<String>,
    pub template: Option<TemplateOutput>,
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformMetadata {
    pub framework: Target,
    pub generated_code: GeneratedCode,
}

/// Result of [`Transformer::transform`]. Both forms borrow the input AST,
/// which is never modified.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed<'a> {
    /// Legacy programs are returned as they are
    Passthrough(&'a UnifiedAst),
    Generated {
        ast: &'a UnifiedAst,
        metadata: TransformMetadata,
    },
}

impl<'a> Transformed<'a> {
    pub fn ast(&self) -> &'a UnifiedAst {
        match self {
            Transformed::Passthrough(ast) | Transformed::Generated { ast, .. } => ast,
        }
    }

    pub fn metadata(&self) -> Option<&TransformMetadata> {
        match self {
            Transformed::Passthrough(_) => None,
            Transformed::Generated { metadata, .. } => Some(metadata),
        }
    }

    pub fn into_metadata(self) -> Option<TransformMetadata> {
        match self {
            Transformed::Passthrough(_) => None,
            Transformed::Generated { metadata, .. } => Some(metadata),
        }
    }
}

/// Lowers a unified AST to one target framework.
///
/// Implementations hold configuration only. All output is accumulated in a
/// [`GeneratedCode`] value local to each [`Transformer::transform`] call,
/// so one transformer can serve any number of compilations.
pub trait Transformer: Dialect {
    fn target(&self) -> Target;

    fn options(&self) -> &TransformOptions;

    fn transform<'a>(&self, ast: &'a UnifiedAst) -> Transformed<'a> {
        match ast {
            UnifiedAst::LegacyProgram(_) => {
                log::debug!("Passing legacy program through the {} transformer", self.target());
                Transformed::Passthrough(ast)
            }
            UnifiedAst::Program(program) => Transformed::Generated {
                ast,
                metadata: TransformMetadata {
                    framework: self.target(),
                    generated_code: self.generate(program),
                },
            },
        }
    }

    fn generate(&self, program: &ProgramNode) -> GeneratedCode {
        generate(self, program)
    }

    /// The state declaration of a reactive variable.
    fn transform_reactive_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String;

    /// A plain variable: `let` when some function reassigns it, else `const`.
    fn transform_variable(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String {
        let keyword = if node.update_triggers.is_empty() { "const" } else { "let" };
        let init = print_expression(&node.initializer, self, symbols, Place::Script);
        format!("{} {} = {};", keyword, node.name, init)
    }

    fn transform_dollar_function(&self, node: &FunctionDeclarationNode, symbols: &Symbols) -> String;

    fn transform_template(&self, node: &TemplateNode, symbols: &Symbols) -> TemplateOutput {
        rewrite_template(node, self, symbols)
    }

    /// Code that recomputes a derived reactive variable when one of its
    /// dependencies changes.
    fn transform_derived(&self, node: &VariableDeclarationNode, symbols: &Symbols) -> String;

    /// Subscription forwarding a channel event to its handler for the
    /// lifetime of the component.
    fn transform_channel(&self, channel: &Channel) -> String;

    /// Imports of framework primitives the program needs.
    fn framework_imports(&self, program: &ProgramNode) -> Vec<String>;

    /// Assembles the generated pieces into a complete file.
    fn compose(&self, name: &str, code: &GeneratedCode) -> String;
}

fn generate<T: Transformer + ?Sized>(transformer: &T, program: &ProgramNode) -> GeneratedCode {
    let symbols = Symbols::from_program(program);
    let mut code = GeneratedCode::default();
    let mut user_imports = Vec::new();

    for statement in &program.body {
        match statement {
            Statement::Variable(var) | Statement::ReactiveVariable(var) if var.is_reactive => {
                code.state.push(transformer.transform_reactive_variable(var, &symbols));
                if var.is_derived() {
                    code.effects.push(transformer.transform_derived(var, &symbols));
                }
            }
            Statement::Variable(var) | Statement::ReactiveVariable(var) => {
                code.state.push(transformer.transform_variable(var, &symbols));
            }
            Statement::Function(func) => code.functions.push(transformer.transform_dollar_function(func, &symbols)),
            Statement::Template(template) => code.template = Some(transformer.transform_template(template, &symbols)),
            Statement::Import(import) => {
                let line = import.source.trim();
                user_imports.push(if line.ends_with(';') { line.to_string() } else { format!("{};", line) });
            }
            Statement::Expression(statement) => {
                let expression = print_expression(&statement.expression, transformer, &symbols, Place::Script);
                code.statements.push(format!("{};", expression));
            }
        }
    }

    let channels = &program.frontmatter.channels;
    for channel in channels {
        code.effects.push(transformer.transform_channel(channel));
    }

    code.imports = transformer.framework_imports(program);
    if !channels.is_empty() {
        let module = transformer.quote().quote(&transformer.options().runtime_module);
        code.imports.push(format!("import {{ signals }} from {};", module));
    }
    code.imports.extend(user_imports);

    let name = component_name(
        program.frontmatter.name.as_deref(),
        transformer.options().file_stem.as_deref(),
    );
    code.component = transformer.compose(&name, &code);
    log::debug!(
        "Generated {} component '{}': {} state, {} functions, {} effects",
        transformer.target(),
        name,
        code.state.len(),
        code.functions.len(),
        code.effects.len()
    );
    code
}
