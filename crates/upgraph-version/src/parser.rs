//! Recursive descent parser for version text.
//!
//! ```text
//! version := scalar | string | list | map
//! list    := "[" ( version ( "," version )* )? "]"
//! map     := "{" ( string ":" version ( "," string ":" version )* )? "}"
//! ```

use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::scalar::ScalarVersion;
use crate::span::Span;
use crate::version::Version;

/// Maximum composite nesting accepted by the parser.
pub const MAX_DEPTH: usize = 64;

/// Parser for version text.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse exactly one version and require the input to end after it.
    pub fn parse_complete(&mut self) -> Result<Version, ParseError> {
        let version = self.parse_version(0)?;
        if let Some(extra) = self.lexer.next_token()? {
            return Err(ParseError::new(
                format!("unexpected {} after version", extra.token.describe()),
                extra.span,
            ));
        }
        Ok(version)
    }

    fn parse_version(&mut self, depth: usize) -> Result<Version, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::new(
                format!("versions nest deeper than {} levels", MAX_DEPTH),
                self.eof_span(),
            ));
        }

        let tok = self.expect_any("a version")?;
        match tok.token {
            Token::Scalar(text) | Token::String(text) => {
                Ok(ScalarVersion::parse_spanned(&text, tok.span)?.into())
            }
            Token::LBracket => self.parse_list(depth),
            Token::LBrace => self.parse_map(depth),
            other => Err(ParseError::new(
                format!("expected a version, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn parse_list(&mut self, depth: usize) -> Result<Version, ParseError> {
        let mut items = Vec::new();

        if self.consume_if(&Token::RBracket)? {
            return Ok(Version::list(items));
        }

        loop {
            items.push(self.parse_version(depth + 1)?);

            let tok = self.expect_any("`,` or `]`")?;
            match tok.token {
                Token::Comma => continue,
                Token::RBracket => break,
                other => {
                    return Err(ParseError::new(
                        format!("expected `,` or `]`, found {}", other.describe()),
                        tok.span,
                    ))
                }
            }
        }

        Ok(Version::list(items))
    }

    fn parse_map(&mut self, depth: usize) -> Result<Version, ParseError> {
        let mut entries: Vec<(String, Version)> = Vec::new();

        if self.consume_if(&Token::RBrace)? {
            return Ok(Version::map(entries));
        }

        loop {
            let key_tok = self.expect_any("a quoted key")?;
            let key = match key_tok.token {
                Token::String(key) => key,
                other => {
                    return Err(ParseError::new(
                        format!("expected a quoted key, found {}", other.describe()),
                        key_tok.span,
                    ))
                }
            };
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(ParseError::new(format!("duplicate key \"{}\"", key), key_tok.span));
            }

            let colon = self.expect_any("`:`")?;
            if colon.token != Token::Colon {
                return Err(ParseError::new(
                    format!("expected `:`, found {}", colon.token.describe()),
                    colon.span,
                ));
            }

            let value = self.parse_version(depth + 1)?;
            entries.push((key, value));

            let tok = self.expect_any("`,` or `}`")?;
            match tok.token {
                Token::Comma => continue,
                Token::RBrace => break,
                other => {
                    return Err(ParseError::new(
                        format!("expected `,` or `}}`, found {}", other.describe()),
                        tok.span,
                    ))
                }
            }
        }

        Ok(Version::map(entries))
    }

    fn expect_any(&mut self, expected: &str) -> Result<SpannedToken, ParseError> {
        self.lexer.next_token()?.ok_or_else(|| {
            ParseError::new(
                format!("unexpected end of input, expected {}", expected),
                self.eof_span(),
            )
        })
    }

    fn consume_if(&mut self, token: &Token) -> Result<bool, ParseError> {
        let matches = matches!(self.lexer.peek()?, Some(t) if t.token == *token);
        if matches {
            self.lexer.next_token()?;
        }
        Ok(matches)
    }

    fn eof_span(&self) -> Span {
        Span::eof(self.source)
    }
}

/// Parse version text.
pub fn parse(source: &str) -> Result<Version, ParseError> {
    Parser::new(source).parse_complete()
}
