use super::decl::{BlockStatementNode, Parameter};
use mtm_source::SourceRange;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    pub kind: ExprKind,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(Identifier),
    Array(Vec<ExpressionNode>),
    Object(Vec<Property>),
    Unary {
        op: UnaryOp,
        operand: Box<ExpressionNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Conditional {
        test: Box<ExpressionNode>,
        consequent: Box<ExpressionNode>,
        alternate: Box<ExpressionNode>,
    },
    Call {
        callee: Box<ExpressionNode>,
        arguments: Vec<ExpressionNode>,
    },
    Member {
        object: Box<ExpressionNode>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<ExpressionNode>,
        index: Box<ExpressionNode>,
    },
    Await(Box<ExpressionNode>),
    New {
        callee: Box<ExpressionNode>,
        arguments: Vec<ExpressionNode>,
    },
    Assign {
        op: AssignOp,
        target: Box<ExpressionNode>,
        value: Box<ExpressionNode>,
    },
    Update {
        increment: bool,
        prefix: bool,
        target: Box<ExpressionNode>,
    },
    Paren(Box<ExpressionNode>),
    Spread(Box<ExpressionNode>),
    ArrowFunction {
        parameters: Vec<Parameter>,
        body: ArrowBody,
        is_async: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Block(BlockStatementNode),
    Expression(Box<ExpressionNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Number literals keep their source text so integral and fractional
    /// forms survive code generation unchanged.
    Number { raw: String, value: f64 },
    Boolean(bool),
    Null,
    Undefined,
    /// Backtick template literal, content kept verbatim
    Template(String),
}

impl Literal {
    /// True for number literals written without a fractional part or exponent.
    pub fn is_integral(&self) -> bool {
        match self {
            Literal::Number { raw, value } => {
                !raw.contains(['.', 'e', 'E']) && value.fract() == 0.0
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Name without the dollar prefix
    pub name: String,
    pub has_dollar_prefix: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: ExpressionNode,
    /// `{ name }` written without a value
    pub shorthand: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    TypeOf,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::TypeOf => "typeof ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }

    /// The binary operator a compound assignment applies.
    pub fn binary(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Nullish,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or | BinaryOp::Nullish => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self.precedence(), 3 | 4)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self.precedence(), 5 | 6)
    }
}

impl ExpressionNode {
    pub fn new(kind: ExprKind, range: SourceRange) -> Self {
        Self { kind, range }
    }

    /// Dollar-prefixed identifiers referenced by this expression, in source
    /// order. Block bodies of nested arrow functions are opaque and skipped.
    pub fn dollar_references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_dollar_references(&mut names);
        names
    }

    fn collect_dollar_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            ExprKind::Identifier(ident) if ident.has_dollar_prefix => names.push(&ident.name),
            ExprKind::Identifier(_) | ExprKind::Literal(_) => {}
            ExprKind::Array(elements) => {
                for element in elements {
                    element.collect_dollar_references(names);
                }
            }
            ExprKind::Object(properties) => {
                for property in properties {
                    property.value.collect_dollar_references(names);
                }
            }
            ExprKind::Unary { operand, .. } => operand.collect_dollar_references(names),
            ExprKind::Binary { left, right, .. } => {
                left.collect_dollar_references(names);
                right.collect_dollar_references(names);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                test.collect_dollar_references(names);
                consequent.collect_dollar_references(names);
                alternate.collect_dollar_references(names);
            }
            ExprKind::Call { callee, arguments } => {
                callee.collect_dollar_references(names);
                for argument in arguments {
                    argument.collect_dollar_references(names);
                }
            }
            ExprKind::Member { object, .. } => object.collect_dollar_references(names),
            ExprKind::Index { object, index } => {
                object.collect_dollar_references(names);
                index.collect_dollar_references(names);
            }
            ExprKind::New { callee, arguments } => {
                callee.collect_dollar_references(names);
                for argument in arguments {
                    argument.collect_dollar_references(names);
                }
            }
            ExprKind::Assign { target, value, .. } => {
                target.collect_dollar_references(names);
                value.collect_dollar_references(names);
            }
            ExprKind::Await(inner)
            | ExprKind::Paren(inner)
            | ExprKind::Spread(inner)
            | ExprKind::Update { target: inner, .. } => inner.collect_dollar_references(names),
            ExprKind::ArrowFunction { body, .. } => {
                if let ArrowBody::Expression(inner) = body {
                    inner.collect_dollar_references(names);
                }
            }
        }
    }

    /// Nesting depth of object/array literals; scalars are depth 0.
    pub fn literal_depth(&self) -> usize {
        match &self.kind {
            ExprKind::Object(properties) => {
                1 + properties.iter().map(|p| p.value.literal_depth()).max().unwrap_or(0)
            }
            ExprKind::Array(elements) => {
                1 + elements.iter().map(ExpressionNode::literal_depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(Literal::Null))
    }

    /// The expression with any wrapping parentheses removed.
    pub fn unparenthesized(&self) -> &ExpressionNode {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparenthesized(),
            _ => self,
        }
    }
}
