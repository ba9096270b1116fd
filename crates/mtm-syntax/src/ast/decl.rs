use super::expr::ExpressionNode;
use super::types::{TypeAnnotationNode, TypeInfo};
use mtm_source::{SourceLocation, SourceRange};

/// `$name[!][: type] = initializer`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationNode {
    /// Identifier without the dollar prefix
    pub name: String,
    pub has_dollar_prefix: bool,
    pub has_reactive_suffix: bool,
    pub type_annotation: Option<TypeAnnotationNode>,
    pub initializer: ExpressionNode,
    pub inferred_type: TypeInfo,
    pub scope: Scope,
    /// Mirrors `has_reactive_suffix`
    pub is_reactive: bool,
    /// Functions whose bodies assign this variable, in declaration order
    pub update_triggers: Vec<String>,
    /// Other declared variables the initializer reads, in first-use order
    pub dependencies: Vec<String>,
    /// Whole statement
    pub range: SourceRange,
    /// The `$name` token
    pub name_range: SourceRange,
}

impl VariableDeclarationNode {
    /// Type the declaration ends up with: the annotation when present,
    /// otherwise the inferred type.
    pub fn effective_type(&self) -> TypeInfo {
        self.type_annotation
            .as_ref()
            .map(|annotation| annotation.type_info)
            .unwrap_or(self.inferred_type)
    }

    pub fn is_derived(&self) -> bool {
        self.is_reactive && !self.dependencies.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Scope {
    /// Component-local state; the only scope top-level declarations get
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: SourceLocation,
}

/// An opaque statement sequence, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStatementNode {
    /// Text between the braces, or the expression for `=> expr` bodies
    pub source: String,
    /// Span of `source` within the original file
    pub range: SourceRange,
    /// Concise body (`=> expr`) rather than a braced block
    pub is_expression: bool,
}

/// `$name = [async] (params) => body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclarationNode {
    pub name: String,
    pub has_dollar_prefix: bool,
    pub parameters: Vec<Parameter>,
    pub body: BlockStatementNode,
    pub is_arrow: bool,
    /// Arrow functions capture the enclosing `this`
    pub auto_bind_this: bool,
    pub is_async: bool,
    pub range: SourceRange,
}

/// An `import` line, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclarationNode {
    pub source: String,
    /// Module specifier between the quotes
    pub module: String,
    pub range: SourceRange,
}

/// Any other top-level expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatementNode {
    pub expression: ExpressionNode,
    pub range: SourceRange,
}
