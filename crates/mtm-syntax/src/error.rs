use miette::{Diagnostic, SourceSpan};
use mtm_source::SourceLocation;
use thiserror::Error;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors produced while lexing or parsing a component.
///
/// Every message ends with `(line L, column C)` so downstream tooling can
/// recover the position from the rendered text alone.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Unexpected character '{found}' ({location})")]
    #[diagnostic(code(mtm_syntax::unexpected_character))]
    UnexpectedCharacter {
        found: String,
        location: SourceLocation,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("Unterminated string literal ({location})")]
    #[diagnostic(code(mtm_syntax::unterminated_string), help("Close the string with the same quote it was opened with"))]
    UnterminatedString {
        location: SourceLocation,
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("Unexpected token '{found}', expected {expected} ({location})")]
    #[diagnostic(code(mtm_syntax::unexpected_token))]
    UnexpectedToken {
        found: String,
        expected: String,
        location: SourceLocation,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("Unexpected end of input, expected {expected} ({location})")]
    #[diagnostic(code(mtm_syntax::unexpected_eof))]
    UnexpectedEof {
        expected: String,
        location: SourceLocation,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("Variable '{name}' is missing the dollar prefix ($) ({location})")]
    #[diagnostic(code(mtm_syntax::missing_dollar_prefix), help("Declare it as '${name} = value'"))]
    MissingDollarPrefix {
        name: String,
        location: SourceLocation,
        #[label("add '$' here")]
        span: SourceSpan,
    },

    #[error("'{keyword}' declarations are not supported, declare '{name}' with the dollar prefix ($) instead ({location})")]
    #[diagnostic(code(mtm_syntax::declaration_keyword), help("Write '${name} = value' or '${name}! = value' for reactive state"))]
    DeclarationKeyword {
        keyword: String,
        name: String,
        location: SourceLocation,
        #[label("remove this keyword")]
        span: SourceSpan,
    },

    #[error("Invalid identifier '{name}' after dollar prefix ($) ({location})")]
    #[diagnostic(code(mtm_syntax::invalid_identifier))]
    InvalidIdentifier {
        name: String,
        location: SourceLocation,
        #[label("not a valid identifier")]
        span: SourceSpan,
    },

    #[error("Invalid reactive syntax: '!' must immediately follow '${name}' ({location})")]
    #[diagnostic(code(mtm_syntax::reactive_suffix), help("Remove the space: '${name}!'"))]
    ReactiveSuffix {
        name: String,
        location: SourceLocation,
        #[label("unexpected whitespace before '!'")]
        span: SourceSpan,
    },

    #[error("Missing ':' before type annotation '{type_name}' of '${name}' ({location})")]
    #[diagnostic(code(mtm_syntax::missing_type_colon), help("Write '${name}: {type_name} = value'"))]
    MissingTypeColon {
        name: String,
        type_name: String,
        location: SourceLocation,
        #[label("expected ':' before this type")]
        span: SourceSpan,
    },

    #[error("Unknown type annotation '{type_name}' ({location})")]
    #[diagnostic(
        code(mtm_syntax::unknown_type),
        help("Supported types: string, number, float, boolean, object, array, function, any")
    )]
    UnknownType {
        type_name: String,
        location: SourceLocation,
        #[label("unknown type")]
        span: SourceSpan,
    },

    #[error("'function' keyword is not supported, use an arrow function so 'this' is bound automatically ({location})")]
    #[diagnostic(code(mtm_syntax::function_keyword), help("Write '$name = (params) => {{ ... }}'"))]
    FunctionKeyword {
        location: SourceLocation,
        #[label("replace with an arrow function")]
        span: SourceSpan,
    },

    #[error("Invalid function syntax: missing '=>' in '${name}' ({location})")]
    #[diagnostic(code(mtm_syntax::missing_arrow), help("Write '${name} = (params) => {{ ... }}'"))]
    MissingArrow {
        name: String,
        location: SourceLocation,
        #[label("expected '=>' here")]
        span: SourceSpan,
    },

    #[error("Ambiguous statement boundary: a line starting with '{found}' continues the previous statement under automatic semicolon insertion ({location})")]
    #[diagnostic(code(mtm_syntax::asi_ambiguity), help("End the previous statement with ';'"))]
    AsiAmbiguity {
        found: String,
        location: SourceLocation,
        #[label("this line joins the previous one")]
        span: SourceSpan,
    },

    #[error("Invalid template binding: {message} ({location})")]
    #[diagnostic(code(mtm_syntax::template_binding))]
    TemplateBinding {
        message: String,
        location: SourceLocation,
        #[label("in this binding")]
        span: SourceSpan,
    },

    #[error("Invalid frontmatter: {message} ({location})")]
    #[diagnostic(code(mtm_syntax::frontmatter))]
    Frontmatter {
        message: String,
        location: SourceLocation,
        #[label("in frontmatter")]
        span: SourceSpan,
    },

    #[error("Unsupported target framework '{name}' ({location})")]
    #[diagnostic(
        code(mtm_syntax::unknown_target),
        help("Supported targets: reactjs, vue, svelte, solid")
    )]
    UnknownTarget {
        name: String,
        location: SourceLocation,
        #[label("not a supported target")]
        span: SourceSpan,
    },

    #[error("Unterminated {construct} ({location})")]
    #[diagnostic(code(mtm_syntax::unterminated_block))]
    UnterminatedBlock {
        construct: String,
        location: SourceLocation,
        #[label("opened here")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SyntaxError::UnexpectedCharacter { location, .. }
            | SyntaxError::UnterminatedString { location, .. }
            | SyntaxError::UnexpectedToken { location, .. }
            | SyntaxError::UnexpectedEof { location, .. }
            | SyntaxError::MissingDollarPrefix { location, .. }
            | SyntaxError::DeclarationKeyword { location, .. }
            | SyntaxError::InvalidIdentifier { location, .. }
            | SyntaxError::ReactiveSuffix { location, .. }
            | SyntaxError::MissingTypeColon { location, .. }
            | SyntaxError::UnknownType { location, .. }
            | SyntaxError::FunctionKeyword { location, .. }
            | SyntaxError::MissingArrow { location, .. }
            | SyntaxError::AsiAmbiguity { location, .. }
            | SyntaxError::TemplateBinding { location, .. }
            | SyntaxError::Frontmatter { location, .. }
            | SyntaxError::UnknownTarget { location, .. }
            | SyntaxError::UnterminatedBlock { location, .. } => *location,
        }
    }

    /// True when the failure happened while reading the frontmatter block.
    pub fn is_frontmatter(&self) -> bool {
        matches!(self, SyntaxError::Frontmatter { .. } | SyntaxError::UnknownTarget { .. })
    }

    /// True when the frontmatter names a framework the compiler cannot emit.
    pub fn is_unknown_target(&self) -> bool {
        matches!(self, SyntaxError::UnknownTarget { .. })
    }
}
