use mtm_syntax::{ExprKind, ProgramNode, VariableDeclarationNode};
use rustc_hash::FxHashMap;

/// Shape of a reactive variable's value. Vue keeps collections in
/// `reactive()` rather than `ref()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateShape {
    Value,
    Array,
    Object,
}

impl StateShape {
    pub fn of(var: &VariableDeclarationNode) -> StateShape {
        match var.initializer.unparenthesized().kind {
            ExprKind::Array(_) => StateShape::Array,
            ExprKind::Object(_) => StateShape::Object,
            _ => StateShape::Value,
        }
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, StateShape::Value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A reactive variable
    State(StateShape),
    /// A plain variable nothing reassigns
    Constant,
    /// A plain variable some function reassigns
    Mutable,
    Function,
}

/// What each top-level `$name` of a component refers to.
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    kinds: FxHashMap<String, SymbolKind>,
}

impl Symbols {
    pub fn from_program(program: &ProgramNode) -> Self {
        let mut kinds = FxHashMap::default();
        for func in program.functions() {
            kinds.insert(func.name.clone(), SymbolKind::Function);
        }
        for var in program.variables() {
            let kind = if var.is_reactive {
                SymbolKind::State(StateShape::of(var))
            } else if var.update_triggers.is_empty() {
                SymbolKind::Constant
            } else {
                SymbolKind::Mutable
            };
            kinds.insert(var.name.clone(), kind);
        }
        Self { kinds }
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.kinds.get(name).copied()
    }

    /// Shape of `name` if it is reactive state.
    pub fn state(&self, name: &str) -> Option<StateShape> {
        match self.kind(name) {
            Some(SymbolKind::State(shape)) => Some(shape),
            _ => None,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }
}
