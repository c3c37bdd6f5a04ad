use crate::error::SyntaxError;

/// A half-open byte range into a source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn text(self, source: &str) -> &str {
        &source[self.start..self.end]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    String,
    Template,
    Number,
    Punct,
    Eof,
}

#[derive(Copy, Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Whitespace and comments between the previous token and this one.
    pub trivia: Span,
    pub newline_before: bool,
}

const MULTI_CHAR_PUNCTUATORS: [&str; 3] = ["...", "=>", "?."];

pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer { source, pos: 0 }.run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let trivia_start = self.pos;
            let newline_before = self.skip_trivia()?;
            let trivia = Span::new(trivia_start, self.pos);
            let start = self.pos;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                    trivia,
                    newline_before,
                });
                return Ok(tokens);
            };

            let kind = if is_identifier_start(c) {
                self.eat_while(is_identifier_part);
                TokenKind::Identifier
            } else if c.is_ascii_digit() {
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
                TokenKind::Number
            } else if c == '"' || c == '\'' {
                self.string(c)?;
                TokenKind::String
            } else if c == '`' {
                self.string('`')?;
                TokenKind::Template
            } else {
                let rest = &self.source[self.pos..];
                match MULTI_CHAR_PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
                    Some(p) => self.pos += p.len(),
                    None => self.pos += c.len_utf8(),
                }
                TokenKind::Punct
            };

            tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
                trivia,
                newline_before,
            });
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Skips whitespace and comments, returning whether a line break was crossed.
    fn skip_trivia(&mut self) -> Result<bool, SyntaxError> {
        let mut newline = false;
        loop {
            let rest = &self.source[self.pos..];
            if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.pos += len;
            } else if rest.starts_with("/*") {
                let Some(len) = rest[2..].find("*/") else {
                    return Err(SyntaxError::new(self.pos, "unterminated block comment"));
                };
                newline |= rest[..len + 2].contains('\n');
                self.pos += len + 4;
            } else if let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
                newline |= c == '\n';
                self.pos += c.len_utf8();
            } else {
                return Ok(newline);
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        while let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if c == '\\' {
                if let Some(escaped) = self.peek() {
                    self.pos += escaped.len_utf8();
                }
            } else if c == quote {
                return Ok(());
            } else if c == '\n' && quote != '`' {
                break;
            }
        }
        Err(SyntaxError::new(start, "unterminated string literal"))
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
