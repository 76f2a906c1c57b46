//! Lexer for the version grammar using logos.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types for version text.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Bare scalar, e.g. `1.2.3` or `1.2.3.beta-1`.
    #[regex(r"[0-9]+\.[0-9]+\.[0-9]+(\.[A-Za-z0-9_\-]+)?", |lex| lex.slice().to_string())]
    Scalar(String),

    /// Double-quoted string: a quoted scalar or a map key.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl Token {
    /// Human-readable token description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Scalar(s) => format!("scalar `{}`", s),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Comma => "`,`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
        }
    }
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens and rejects unknown input.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<SpannedToken>>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&SpannedToken>, ParseError> {
        if self.peeked.is_none() {
            let next = self.next_inner()?;
            self.peeked = Some(next);
        }
        Ok(self.peeked.as_ref().and_then(|o| o.as_ref()))
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, ParseError> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.next_inner(),
        }
    }

    fn next_inner(&mut self) -> Result<Option<SpannedToken>, ParseError> {
        match self.inner.next() {
            Some(Ok(token)) => Ok(Some(SpannedToken {
                token,
                span: self.inner.span().into(),
            })),
            Some(Err(())) => Err(ParseError::new(
                format!("unexpected input `{}`", self.inner.slice()),
                self.inner.span().into(),
            )
            .with_hint("scalars are MAJOR.MINOR.MICRO[.QUALIFIER], keys are double-quoted")),
            None => Ok(None),
        }
    }
}

/// Tokenize a source string, stopping at the first invalid token.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_quoted_scalars() {
        let tokens = tokenize(r#"1.2.3 "4.5.6.rc1""#).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, Token::Scalar("1.2.3".to_string()));
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[1].token, Token::String("4.5.6.rc1".to_string()));
    }

    #[test]
    fn test_composite_punctuation() {
        let tokens = tokenize(r#"{ "a": [0.0.1, 0.0.2] }"#).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.token.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::LBrace,
                Token::String("a".to_string()),
                Token::Colon,
                Token::LBracket,
                Token::Scalar("0.0.1".to_string()),
                Token::Comma,
                Token::Scalar("0.0.2".to_string()),
                Token::RBracket,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\"b""#).unwrap();
        assert_eq!(tokens[0].token, Token::String("a\"b".to_string()));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        assert!(tokenize("1.2").is_err());
        assert!(tokenize("abc").is_err());
        // The bare scalar stops after the qualifier; the trailing `.5` is garbage.
        assert!(tokenize("1.2.3.4.5").is_err());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("[ ]");
        assert_eq!(lexer.peek().unwrap().map(|t| &t.token), Some(&Token::LBracket));
        assert_eq!(lexer.peek().unwrap().map(|t| &t.token), Some(&Token::LBracket));
        assert_eq!(lexer.next_token().unwrap().map(|t| t.token), Some(Token::LBracket));
        assert_eq!(lexer.next_token().unwrap().map(|t| t.token), Some(Token::RBracket));
        assert!(lexer.next_token().unwrap().is_none());
    }
}
