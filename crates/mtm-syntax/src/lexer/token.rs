use logos::Logos;
use miette::SourceSpan;

/// A token spans from `span.offset()` to `span.offset() + span.len()` within
/// the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: SourceSpan,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

impl<'a> Token<'a> {
    pub fn start(&self) -> usize {
        self.span.offset()
    }

    pub fn end(&self) -> usize {
        self.span.offset() + self.span.len()
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.lexeme == word
    }

    /// Name of a `$name` token without the prefix.
    pub fn dollar_name(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::DollarIdent => self.lexeme.strip_prefix('$'),
            _ => None,
        }
    }
}

/// Every token of the modern component syntax.
#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifiers
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    DollarIdent,
    #[token("$")]
    Dollar,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    #[regex(r#"'([^'\\\n]|\\.)*"#)]
    UnterminatedString,
    #[regex(r"`([^`\\]|\\.)*`")]
    TemplateString,

    // Multi-character operators
    #[token("=>")]
    Arrow,
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNotEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("??")]
    Nullish,
    #[token("?.")]
    OptionalDot,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("...")]
    Spread,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Comments and whitespace (to be skipped)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    // Catch-all for anything unexpected
    #[error]
    Error,
}

impl TokenKind {
    /// Compound assignment, or plain `=`.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq | TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq
        )
    }

    pub fn is_update(&self) -> bool {
        matches!(self, TokenKind::PlusPlus | TokenKind::MinusMinus)
    }

    pub fn is_opening(&self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace)
    }

    pub fn is_closing(&self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
    }

    /// Human readable name used in "expected ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::DollarIdent => "a '$' identifier",
            TokenKind::Dollar => "'$'",
            TokenKind::Ident => "an identifier",
            TokenKind::Number => "a number",
            TokenKind::String | TokenKind::UnterminatedString => "a string",
            TokenKind::TemplateString => "a template literal",
            TokenKind::Arrow => "'=>'",
            TokenKind::StrictEq => "'==='",
            TokenKind::StrictNotEq => "'!=='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Nullish => "'??'",
            TokenKind::OptionalDot => "'?.'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::Spread => "'...'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::Bang => "'!'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LineComment | TokenKind::BlockComment => "a comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Error => "an unrecognized character",
        }
    }
}
