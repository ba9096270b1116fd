use super::expr::ExpressionNode;
use mtm_source::{SourceLocation, SourceRange};

/// Markup between `<template>` and `</template>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    /// Raw markup, still holding `{{$var}}` and `event="$handler()"` forms
    pub content: String,
    pub bindings: Vec<DataBindingNode>,
    /// Expressions referenced by `Expression` bindings, by index
    pub expressions: Vec<ExpressionNode>,
    /// Span of `content`
    pub range: SourceRange,
}

impl TemplateNode {
    pub fn event_bindings(&self) -> impl Iterator<Item = &DataBindingNode> {
        self.bindings
            .iter()
            .filter(|binding| binding.binding_type == BindingType::Event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    Variable,
    Expression,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateStrategy {
    Immediate,
    /// Bound value never changes after the first render
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBindingNode {
    pub binding_type: BindingType,
    /// Bound variable or handler name without the dollar prefix; for
    /// expression bindings, the expression text
    pub source: String,
    /// `textContent` for interpolations, the attribute name for events
    pub target: String,
    pub is_reactive: bool,
    pub update_strategy: UpdateStrategy,
    pub location: SourceLocation,
    /// Index into `TemplateNode::expressions`
    pub expression: Option<usize>,
    /// Handler call arguments as written, for event bindings
    pub arguments: Option<String>,
    /// The full `{{ ... }}` or `attr="..."` text in the original source
    pub range: SourceRange,
}
