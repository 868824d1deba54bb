//! # Lexer for Assembly Source Lines

use logos::Logos;

/// Tokens within a single source line.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip inline whitespace
#[logos(skip r"[;#][^\n]*")] // Skip comments
pub enum Token {
    /// Mnemonic word (case-sensitive; the catalog decides validity)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),

    /// Signed decimal number
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Number(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_instruction() {
        let mut lex = Token::lexer("PUSH 42");
        assert_eq!(lex.next(), Some(Ok(Token::Word("PUSH".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(42))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_negative_number() {
        let mut lex = Token::lexer("PUSH -17");
        assert_eq!(lex.next(), Some(Ok(Token::Word("PUSH".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(-17))));
    }

    #[test]
    fn test_lexer_skips_comments() {
        let mut lex = Token::lexer("ADD ; pop two, push sum");
        assert_eq!(lex.next(), Some(Ok(Token::Word("ADD".to_string()))));
        assert_eq!(lex.next(), None);

        let mut lex = Token::lexer("# whole-line comment");
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_blank_line() {
        let mut lex = Token::lexer("   \t  ");
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_stray_character_is_error() {
        let mut lex = Token::lexer("PUSH $5");
        assert_eq!(lex.next(), Some(Ok(Token::Word("PUSH".to_string()))));
        assert_eq!(lex.next(), Some(Err(())));
    }

    #[test]
    fn test_lexer_oversized_number_is_error() {
        // Does not fit i64; the callback rejects it.
        let mut lex = Token::lexer("99999999999999999999999");
        assert_eq!(lex.next(), Some(Err(())));
    }
}
