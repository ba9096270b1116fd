use mtm_source::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of base types known to the modern syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    String,
    Number,
    Float,
    Boolean,
    Object,
    Array,
    Function,
    Any,
}

impl BaseType {
    pub const ALL: [BaseType; 8] = [
        BaseType::String,
        BaseType::Number,
        BaseType::Float,
        BaseType::Boolean,
        BaseType::Object,
        BaseType::Array,
        BaseType::Function,
        BaseType::Any,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Float => "float",
            BaseType::Boolean => "boolean",
            BaseType::Object => "object",
            BaseType::Array => "array",
            BaseType::Function => "function",
            BaseType::Any => "any",
        }
    }

    pub fn from_name(name: &str) -> Option<BaseType> {
        BaseType::ALL.into_iter().find(|ty| ty.name() == name)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, BaseType::Number | BaseType::Float)
    }

    /// Comma separated list of every supported type name.
    pub fn supported_list() -> String {
        BaseType::ALL.iter().map(BaseType::name).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of type inference or of reading an annotation.
///
/// `Any` means inference failed or the value is genuinely ambiguous; it is
/// never silently replaced by a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub base_type: BaseType,
    pub nullable: bool,
}

impl TypeInfo {
    pub const fn new(base_type: BaseType) -> Self {
        Self { base_type, nullable: false }
    }

    pub const fn nullable(base_type: BaseType) -> Self {
        Self { base_type, nullable: true }
    }

    pub const fn any() -> Self {
        Self::new(BaseType::Any)
    }

    pub fn is_any(&self) -> bool {
        self.base_type == BaseType::Any
    }
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{} | null", self.base_type)
        } else {
            write!(f, "{}", self.base_type)
        }
    }
}

/// An explicit annotation such as `: number` or `: Array<string>?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotationNode {
    /// The type text as written, without the colon
    pub raw: String,
    pub type_info: TypeInfo,
    /// Element type for `T[]` and `Array<T>`
    pub element_type: Option<BaseType>,
    /// Span of the type text
    pub range: SourceRange,
    /// Span from the colon through the end of the type
    pub annotation_range: SourceRange,
}
