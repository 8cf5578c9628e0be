//! Tokenizer for the datashape surface syntax.
//!
//! The scanner turns source text into a flat token stream. Identifiers
//! are not classified into keywords here; the parser decides whether a
//! name is a scalar type, a dimension keyword, a typevar, or a nominal
//! reference from context. String literals are stored with their quote
//! pair already stripped.

use datashape_common::{Error, Result, Span};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*`
    Name,
    /// Base-10 signed integer literal
    Int,
    /// Decimal float literal (fraction and/or exponent present)
    Float,
    /// Single- or double-quoted string literal, quotes stripped
    StringLit,
    Star,
    Comma,
    Colon,
    Equals,
    Question,
    Ampersand,
    Arrow,
    Ellipsis,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Eof,
}

impl TokenKind {
    /// Short description used in parser diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            TokenKind::Name => "identifier",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::StringLit => "string literal",
            TokenKind::Star => "'*'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Equals => "'='",
            TokenKind::Question => "'?'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Arrow => "'->'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Eof => "end of input",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The lexeme. For `StringLit` the surrounding quotes are stripped.
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for a `Name` token with exactly this text.
    #[must_use]
    pub fn is_name(&self, text: &str) -> bool {
        self.kind == TokenKind::Name && self.text == text
    }
}

/// Tokenize an entire datashape source string.
///
/// Whitespace and `#` line comments are skipped. The returned stream
/// always ends with a single `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).run()
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.pos;
            let Some(byte) = self.peek() else {
                tokens.push(self.token(TokenKind::Eof, start));
                return Ok(tokens);
            };
            let kind = match byte {
                b'*' => self.single(TokenKind::Star),
                b',' => self.single(TokenKind::Comma),
                b':' => self.single(TokenKind::Colon),
                b'=' => self.single(TokenKind::Equals),
                b'?' => self.single(TokenKind::Question),
                b'&' => self.single(TokenKind::Ampersand),
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                b'{' => self.single(TokenKind::LBrace),
                b'}' => self.single(TokenKind::RBrace),
                b'.' => self.ellipsis(start)?,
                b'-' => self.minus(start)?,
                b'\'' | b'"' => self.string_literal(start)?,
                b'0'..=b'9' => self.number(start)?,
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.name(),
                _ => {
                    return Err(Error::lex(format!("invalid character '{}'", byte as char))
                        .with_span(Span::at(start as u32)));
                }
            };
            tokens.push(self.make(kind, start));
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'#' => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn ellipsis(&mut self, start: usize) -> Result<TokenKind> {
        if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
            self.pos += 3;
            return Ok(TokenKind::Ellipsis);
        }
        Err(Error::lex("expected '...'").with_span(Span::at(start as u32)))
    }

    fn minus(&mut self, start: usize) -> Result<TokenKind> {
        match self.peek_at(1) {
            Some(b'>') => {
                self.pos += 2;
                Ok(TokenKind::Arrow)
            }
            Some(b'0'..=b'9') => {
                self.pos += 1;
                self.number(start)
            }
            _ => Err(Error::lex("expected '->' or a negative number")
                .with_span(Span::at(start as u32))),
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<TokenKind> {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        while let Some(byte) = self.peek() {
            self.pos += 1;
            if byte == quote {
                return Ok(TokenKind::StringLit);
            }
        }
        Err(Error::lex("unterminated string literal").with_span(Span::at(start as u32)))
    }

    fn number(&mut self, start: usize) -> Result<TokenKind> {
        let mut is_float = false;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut ahead = 1;
            if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                ahead = 2;
            }
            if matches!(self.peek_at(ahead), Some(b'0'..=b'9')) {
                is_float = true;
                self.pos += ahead;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
        }
        // A trailing identifier character means a malformed literal like `12x`.
        if matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_')) {
            return Err(Error::lex("invalid numeric literal").with_span(Span::at(start as u32)));
        }
        Ok(if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        })
    }

    fn name(&mut self) -> TokenKind {
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        TokenKind::Name
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        let text = match kind {
            // Strip the quote pair; the scanner guarantees both are present.
            TokenKind::StringLit => {
                std::str::from_utf8(&self.bytes[start + 1..self.pos - 1]).unwrap_or_default()
            }
            _ => std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default(),
        };
        Token {
            kind,
            text: text.to_string(),
            span: Span::new(start as u32, self.pos as u32),
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: String::new(),
            span: Span::at(start as u32),
        }
    }
}
