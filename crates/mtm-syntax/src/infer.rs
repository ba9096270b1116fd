//! Type inference over expression shapes.
//!
//! Inference never fails: anything it cannot decide comes back as `any`
//! with low confidence, and it is up to the caller to report that.

use crate::ast::{BaseType, BinaryOp, ExprKind, ExpressionNode, Literal, TypeInfo, UnaryOp};
use mtm_source::Confidence;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inference {
    pub type_info: TypeInfo,
    pub confidence: Confidence,
}

impl Inference {
    fn high(base_type: BaseType) -> Self {
        Self {
            type_info: TypeInfo::new(base_type),
            confidence: Confidence::High,
        }
    }

    fn medium(base_type: BaseType) -> Self {
        Self {
            type_info: TypeInfo::new(base_type),
            confidence: Confidence::Medium,
        }
    }

    fn low(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            confidence: Confidence::Low,
        }
    }

    fn unknown() -> Self {
        Self::low(TypeInfo::any())
    }
}

/// Infers types against a table of already declared names.
#[derive(Debug, Clone, Default)]
pub struct TypeInferrer {
    symbols: FxHashMap<String, TypeInfo>,
}

impl TypeInferrer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of a declared name (without the dollar prefix).
    pub fn declare(&mut self, name: impl Into<String>, type_info: TypeInfo) {
        self.symbols.insert(name.into(), type_info);
    }

    pub fn lookup(&self, name: &str) -> Option<TypeInfo> {
        self.symbols.get(name).copied()
    }

    pub fn infer(&self, expression: &ExpressionNode) -> Inference {
        match &expression.kind {
            ExprKind::Literal(literal) => infer_literal(literal),
            ExprKind::Identifier(ident) => match self.lookup(&ident.name) {
                Some(type_info) => Inference {
                    type_info,
                    confidence: Confidence::High,
                },
                None => Inference::unknown(),
            },
            ExprKind::Array(elements) if elements.is_empty() => Inference::low(TypeInfo::new(BaseType::Array)),
            ExprKind::Array(_) => Inference::high(BaseType::Array),
            ExprKind::Object(properties) if properties.is_empty() => {
                Inference::low(TypeInfo::new(BaseType::Object))
            }
            ExprKind::Object(_) => Inference::high(BaseType::Object),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => Inference::high(BaseType::Boolean),
                UnaryOp::TypeOf => Inference::high(BaseType::String),
                UnaryOp::Negate | UnaryOp::Plus => {
                    let inner = self.infer(operand);
                    if inner.type_info.base_type.is_numeric() {
                        inner
                    } else {
                        Inference::medium(BaseType::Number)
                    }
                }
            },
            ExprKind::Binary { op, left, right } => self.infer_binary(*op, left, right),
            ExprKind::Conditional { consequent, alternate, .. } => {
                let left = self.infer(consequent);
                let right = self.infer(alternate);
                if left.type_info == right.type_info {
                    Inference {
                        type_info: left.type_info,
                        confidence: left.confidence.min(right.confidence),
                    }
                } else {
                    Inference::unknown()
                }
            }
            ExprKind::Member { property, .. } if property == "length" => Inference::medium(BaseType::Number),
            ExprKind::ArrowFunction { .. } => Inference::high(BaseType::Function),
            ExprKind::New { .. } => Inference::medium(BaseType::Object),
            ExprKind::Update { .. } => Inference::high(BaseType::Number),
            ExprKind::Assign { value, .. } => self.infer(value),
            ExprKind::Paren(inner) => self.infer(inner),
            ExprKind::Call { .. }
            | ExprKind::Member { .. }
            | ExprKind::Index { .. }
            | ExprKind::Await(_)
            | ExprKind::Spread(_) => Inference::unknown(),
        }
    }

    fn infer_binary(&self, op: BinaryOp, left: &ExpressionNode, right: &ExpressionNode) -> Inference {
        if op.is_comparison() {
            return Inference::high(BaseType::Boolean);
        }

        let lhs = self.infer(left);
        let rhs = self.infer(right);
        let (l, r) = (lhs.type_info.base_type, rhs.type_info.base_type);
        let confidence = lhs.confidence.min(rhs.confidence);

        match op {
            BinaryOp::Add if l == BaseType::String || r == BaseType::String => Inference {
                type_info: TypeInfo::new(BaseType::String),
                confidence,
            },
            _ if op.is_arithmetic() && l.is_numeric() && r.is_numeric() => {
                let base_type = if op == BinaryOp::Div || l == BaseType::Float || r == BaseType::Float {
                    BaseType::Float
                } else {
                    BaseType::Number
                };
                let confidence = if op == BinaryOp::Div { Confidence::Medium.min(confidence) } else { confidence };
                Inference {
                    type_info: TypeInfo::new(base_type),
                    confidence,
                }
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish if l == r && l != BaseType::Any => Inference {
                type_info: TypeInfo::new(l),
                confidence,
            },
            _ => Inference::unknown(),
        }
    }
}

fn infer_literal(literal: &Literal) -> Inference {
    match literal {
        Literal::String(_) | Literal::Template(_) => Inference::high(BaseType::String),
        Literal::Number { .. } if literal.is_integral() => Inference::high(BaseType::Number),
        Literal::Number { .. } => Inference::high(BaseType::Float),
        Literal::Boolean(_) => Inference::high(BaseType::Boolean),
        Literal::Null => Inference::low(TypeInfo::nullable(BaseType::Any)),
        Literal::Undefined => Inference::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_expression;

    fn infer(source: &str) -> Inference {
        let mut inferrer = TypeInferrer::new();
        inferrer.declare("count", TypeInfo::new(BaseType::Number));
        inferrer.declare("price", TypeInfo::new(BaseType::Float));
        inferrer.infer(&parse_expression(source).unwrap())
    }

    #[test]
    fn test_literals() {
        assert_eq!(infer("\"hi\"").type_info, TypeInfo::new(BaseType::String));
        assert_eq!(infer("42").type_info, TypeInfo::new(BaseType::Number));
        assert_eq!(infer("4.2").type_info, TypeInfo::new(BaseType::Float));
        assert_eq!(infer("true").type_info, TypeInfo::new(BaseType::Boolean));
    }

    #[test]
    fn test_null_is_nullable_any() {
        let inference = infer("null");
        assert!(inference.type_info.is_any());
        assert!(inference.type_info.nullable);
        assert_eq!(inference.confidence, Confidence::Low);
    }

    #[test]
    fn test_empty_collections_have_low_confidence() {
        assert_eq!(infer("[]"), Inference::low(TypeInfo::new(BaseType::Array)));
        assert_eq!(infer("{}"), Inference::low(TypeInfo::new(BaseType::Object)));
        assert_eq!(infer("[1]").confidence, Confidence::High);
    }

    #[test]
    fn test_identifiers_resolve_through_symbols() {
        assert_eq!(infer("$count").type_info.base_type, BaseType::Number);
        assert_eq!(infer("$missing"), Inference::unknown());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(infer("$count * 2").type_info.base_type, BaseType::Number);
        assert_eq!(infer("$count + $price").type_info.base_type, BaseType::Float);
        assert_eq!(infer("$count / 2").type_info.base_type, BaseType::Float);
        assert_eq!(infer("'n=' + $count").type_info.base_type, BaseType::String);
        assert!(infer("$count * $missing").type_info.is_any());
    }

    #[test]
    fn test_comparisons_and_functions() {
        assert_eq!(infer("$count > 1").type_info.base_type, BaseType::Boolean);
        assert_eq!(infer("() => 1").type_info.base_type, BaseType::Function);
        assert!(infer("fetch(url)").type_info.is_any());
    }
}
