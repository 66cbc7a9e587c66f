//! Logos-based lexer for Sketch
//!
//! Every byte of the input ends up in exactly one token, so the parser can
//! build a lossless tree.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// One lexed token, borrowed from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Iterator over tokens with running byte offsets
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Collects every token of `input`
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Raw logos patterns, converted to `SyntaxKind` on the way out
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("class")]
    Class,

    #[token("fun")]
    Fun,

    #[token("val")]
    Val,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("=")]
    Eq,

    #[regex(r"[+\-*/<>!&|.:%]+|==")]
    Operator,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::Class => SyntaxKind::CLASS_KW,
            LogosToken::Fun => SyntaxKind::FUN_KW,
            LogosToken::Val => SyntaxKind::VAL_KW,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Operator => SyntaxKind::OPERATOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("class classy fun val"),
            vec![
                SyntaxKind::CLASS_KW,
                SyntaxKind::WHITESPACE,
                SyntaxKind::IDENT,
                SyntaxKind::WHITESPACE,
                SyntaxKind::FUN_KW,
                SyntaxKind::WHITESPACE,
                SyntaxKind::VAL_KW,
            ]
        );
    }

    #[test]
    fn test_tokens_cover_input() {
        let input = "fun f(a, b) { return a + b; } // sum\n@";
        let tokens = tokenize(input);
        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, input);
        assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::ERROR));
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let tokens = tokenize("val x = 1;");
        let mut expected = TextSize::new(0);
        for token in tokens {
            assert_eq!(token.offset, expected);
            expected += TextSize::of(token.text);
        }
    }
}
