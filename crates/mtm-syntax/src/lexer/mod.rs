mod token;

pub use token::{Token, TokenKind};

use crate::{SyntaxError, SyntaxResult};
use logos::Logos;
use miette::SourceSpan;
use mtm_source::LineIndex;

/// Tokenizes `input`, failing on the first unrecognized character or
/// unterminated string.
pub fn lex(input: &str) -> SyntaxResult<Vec<Token<'_>>> {
    lex_at(input, 0, &LineIndex::new(input))
}

/// Tokenizes a slice of a larger file that starts at byte `base`.
///
/// Token spans and error locations are reported relative to the whole file
/// described by `index`.
pub fn lex_at<'a>(input: &'a str, base: usize, index: &LineIndex<'_>) -> SyntaxResult<Vec<Token<'a>>> {
    let mut tokens = lex_lenient(input);
    for tok in &mut tokens {
        let location = index.location(base + tok.start());
        let span = SourceSpan::new((base + tok.start()).into(), tok.span.len());
        match tok.kind {
            TokenKind::UnterminatedString => {
                return Err(SyntaxError::UnterminatedString { location, span });
            }
            TokenKind::Error => {
                return Err(SyntaxError::UnexpectedCharacter {
                    found: tok.lexeme.to_string(),
                    location,
                    span,
                });
            }
            _ => tok.span = span,
        }
    }
    Ok(tokens)
}

/// Tokenizes `input` without failing; bad input shows up as
/// `TokenKind::Error` tokens.
///
/// Used on function bodies, which are kept as opaque text and only
/// rewritten token by token.
pub fn lex_lenient(input: &str) -> Vec<Token<'_>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    let mut previous_end = 0;

    while let Some(kind) = lexer.next() {
        let range = lexer.span();
        let lexeme = &input[range.clone()];
        let span = SourceSpan::new(range.start.into(), range.len());
        let newline_before = !tokens.is_empty() && input[previous_end..range.start].contains('\n');
        previous_end = range.end;

        tokens.push(Token {
            kind,
            lexeme,
            span,
            newline_before,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|tok| tok.kind).collect()
    }

    #[test]
    fn test_reactive_declaration() {
        assert_eq!(
            kinds("$count! = 0"),
            vec![TokenKind::DollarIdent, TokenKind::Bang, TokenKind::Eq, TokenKind::Number]
        );
    }

    #[test]
    fn test_arrow_function() {
        assert_eq!(
            kinds("$inc = () => { $count += 1 }"),
            vec![
                TokenKind::DollarIdent,
                TokenKind::Eq,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::LBrace,
                TokenKind::DollarIdent,
                TokenKind::PlusEq,
                TokenKind::Number,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_newline_flags() {
        let tokens = lex("$a = 1\n$b = 2 // trailing\n").unwrap();
        let flags: Vec<bool> = tokens.iter().map(|tok| tok.newline_before).collect();
        assert_eq!(flags, vec![false, false, false, true, false, false]);
    }

    #[test]
    fn test_strings_and_comments() {
        let tokens = lex(r#"$s = "a \"b\"" /* note */ + 'c'"#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].lexeme, r#""a \"b\"""#);
        assert_eq!(tokens[4].lexeme, "'c'");
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("$s = \"open\n").unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedString { .. }));
        assert_eq!(err.location().column, 6);
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("$a = #").unwrap_err();
        assert!(err.to_string().starts_with("Unexpected character '#'"));
    }

    #[test]
    fn test_lex_at_offsets_spans() {
        let source = "<p>{{ $a + 1 }}</p>";
        let index = LineIndex::new(source);
        let tokens = lex_at(&source[5..12], 5, &index).unwrap();
        assert_eq!(tokens[0].lexeme, "$a");
        assert_eq!(tokens[0].start(), 6);
        assert_eq!(tokens[2].end(), 12);
    }

    #[test]
    fn test_lenient_keeps_going() {
        let tokens = lex_lenient("a # b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Error);
    }
}
