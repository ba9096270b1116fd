use super::decl::{
    ExpressionStatementNode, FunctionDeclarationNode, ImportDeclarationNode, VariableDeclarationNode,
};
use super::template::TemplateNode;
use indexmap::IndexMap;
use mtm_source::Target;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of a parsed component.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifiedAst {
    Program(ProgramNode),
    /// Old-syntax files are carried through untouched
    LegacyProgram(LegacyProgramNode),
}

impl UnifiedAst {
    pub fn frontmatter(&self) -> &Frontmatter {
        match self {
            UnifiedAst::Program(program) => &program.frontmatter,
            UnifiedAst::LegacyProgram(legacy) => &legacy.frontmatter,
        }
    }

    pub fn syntax_version(&self) -> SyntaxVersion {
        match self {
            UnifiedAst::Program(program) => program.syntax_version,
            UnifiedAst::LegacyProgram(_) => SyntaxVersion::Legacy,
        }
    }

    pub fn as_program(&self) -> Option<&ProgramNode> {
        match self {
            UnifiedAst::Program(program) => Some(program),
            UnifiedAst::LegacyProgram(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramNode {
    pub body: Vec<Statement>,
    pub frontmatter: Frontmatter,
    pub syntax_version: SyntaxVersion,
    pub modern_features: ModernFeatures,
}

impl ProgramNode {
    /// Plain and reactive variable declarations, in source order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableDeclarationNode> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::Variable(var) | Statement::ReactiveVariable(var) => Some(var),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclarationNode> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::Function(func) => Some(func),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDeclarationNode> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn template(&self) -> Option<&TemplateNode> {
        self.body.iter().find_map(|statement| match statement {
            Statement::Template(template) => Some(template),
            _ => None,
        })
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDeclarationNode> {
        self.variables().find(|var| var.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDeclarationNode> {
        self.functions().find(|func| func.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyProgramNode {
    /// Body text after the frontmatter block
    pub content: String,
    pub frontmatter: Frontmatter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable(VariableDeclarationNode),
    ReactiveVariable(VariableDeclarationNode),
    Function(FunctionDeclarationNode),
    Template(TemplateNode),
    Import(ImportDeclarationNode),
    Expression(ExpressionStatementNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxVersion {
    Legacy,
    Modern,
}

impl fmt::Display for SyntaxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyntaxVersion::Legacy => "legacy",
            SyntaxVersion::Modern => "modern",
        })
    }
}

/// The `---` delimited YAML header of a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub target: Option<Target>,
    /// Component name used in generated output
    pub name: Option<String>,
    pub syntax: Option<SyntaxVersion>,
    pub channels: Vec<Channel>,
    /// Keys the compiler does not interpret, in file order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// A cross-component event subscription: `event` is forwarded to `emit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub event: String,
    pub emit: String,
}

/// Which modern-syntax capabilities a program uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModernFeatures {
    pub dollar_prefix_variables: bool,
    pub reactive_variables: bool,
    pub enhanced_type_inference: bool,
    pub optional_semicolons: bool,
    pub auto_this_binding: bool,
}
