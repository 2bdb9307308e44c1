use std::fmt;

use crate::error::Error;

/// Source location of a token or AST node, 1-based on both axes.
///
/// The scanner tracks lines and columns directly (a newline bumps the line
/// and resets the column), so every downstream diagnostic can point at the
/// offending spot without re-walking the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    Ident(String),
    Number(f64),
    Str(String),

    // Keywords. `hi_bhai`/`bye_bhai` bracket every program.
    HiBhai,
    ByeBhai,
    Chaap,
    Rakho,
    Pakka,
    Agar,
    Warna,
    Jabtak,
    Kaam,
    Wapas,
    BasKaro,
    AglaDekho,
    Sahi,
    Galat,
    Nalla,

    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,

    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

impl fmt::Display for TokenKind {
    /// Canonical surface text of the token. Joining rendered tokens with
    /// whitespace re-lexes to the same kind sequence.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "<eof>"),
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::Number(value) => write!(f, "{value}"),
            TokenKind::Str(value) => write!(f, "\"{}\"", escape_string(value)),
            TokenKind::HiBhai => write!(f, "hi_bhai"),
            TokenKind::ByeBhai => write!(f, "bye_bhai"),
            TokenKind::Chaap => write!(f, "chaap"),
            TokenKind::Rakho => write!(f, "rakho"),
            TokenKind::Pakka => write!(f, "pakka"),
            TokenKind::Agar => write!(f, "agar"),
            TokenKind::Warna => write!(f, "warna"),
            TokenKind::Jabtak => write!(f, "jabtak"),
            TokenKind::Kaam => write!(f, "kaam"),
            TokenKind::Wapas => write!(f, "wapas"),
            TokenKind::BasKaro => write!(f, "bas_karo"),
            TokenKind::AglaDekho => write!(f, "agla_dekho"),
            TokenKind::Sahi => write!(f, "sahi"),
            TokenKind::Galat => write!(f, "galat"),
            TokenKind::Nalla => write!(f, "nalla"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Eq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::And => write!(f, "&&"),
            TokenKind::Or => write!(f, "||"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
        }
    }
}

/// Scans `input` into tokens, ending with a single `Eof` token.
///
/// Stops at the first unrecognized character, malformed number, or
/// unterminated string; the returned error points at where the bad token
/// started.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if eof {
            break;
        }
    }

    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_ignored();

        let pos = Position::new(self.line, self.column);
        let Some(raw) = self.peek_char() else {
            return Ok(Token::new(TokenKind::Eof, pos));
        };

        let start = self.position;
        self.bump_char();

        if raw == '"' {
            return self.read_string(pos);
        }

        if is_ident_start(raw) {
            return Ok(self.read_identifier(start, pos));
        }

        if raw.is_ascii_digit() {
            return self.read_number(start, pos);
        }

        let kind = match raw {
            '=' => {
                if self.peek_char() == Some('=') {
                    self.bump_char();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.bump_char();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.bump_char();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek_char() == Some('=') {
                    self.bump_char();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.peek_char() == Some('&') {
                    self.bump_char();
                    TokenKind::And
                } else {
                    return Err(Error::syntax("unexpected character '&'", pos));
                }
            }
            '|' => {
                if self.peek_char() == Some('|') {
                    self.bump_char();
                    TokenKind::Or
                } else {
                    return Err(Error::syntax("unexpected character '|'", pos));
                }
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            other => {
                return Err(Error::syntax(
                    format!("unexpected character '{}'", other),
                    pos,
                ));
            }
        };

        Ok(Token::new(kind, pos))
    }

    fn read_identifier(&mut self, start: usize, pos: Position) -> Token {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.bump_char();
        }

        let ident = &self.input[start..self.position];
        let kind = match ident {
            "hi_bhai" => TokenKind::HiBhai,
            "bye_bhai" => TokenKind::ByeBhai,
            "chaap" => TokenKind::Chaap,
            "rakho" => TokenKind::Rakho,
            "pakka" => TokenKind::Pakka,
            "agar" => TokenKind::Agar,
            "warna" => TokenKind::Warna,
            "jabtak" => TokenKind::Jabtak,
            "kaam" => TokenKind::Kaam,
            "wapas" => TokenKind::Wapas,
            "bas_karo" => TokenKind::BasKaro,
            "agla_dekho" => TokenKind::AglaDekho,
            "sahi" => TokenKind::Sahi,
            "galat" => TokenKind::Galat,
            "nalla" => TokenKind::Nalla,
            _ => TokenKind::Ident(ident.to_owned()),
        };

        Token::new(kind, pos)
    }

    fn read_number(&mut self, start: usize, pos: Position) -> Result<Token, Error> {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump_char();
        }

        if self.peek_char() == Some('.') {
            self.bump_char();
            if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                let raw = &self.input[start..self.position];
                return Err(Error::syntax(
                    format!("malformed number literal '{raw}' (expected digits after '.')"),
                    pos,
                ));
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump_char();
            }
        }

        let raw = &self.input[start..self.position];
        let number = raw
            .parse::<f64>()
            .map_err(|_| Error::syntax(format!("invalid number literal '{raw}'"), pos))?;

        Ok(Token::new(TokenKind::Number(number), pos))
    }

    // `pos` is the opening quote; unterminated strings are reported there.
    fn read_string(&mut self, pos: Position) -> Result<Token, Error> {
        let mut value = String::new();

        while let Some(c) = self.peek_char() {
            self.bump_char();

            if c == '"' {
                return Ok(Token::new(TokenKind::Str(value), pos));
            }

            if c == '\\' {
                let Some(esc) = self.peek_char() else {
                    return Err(Error::syntax("unterminated escape sequence in string", pos));
                };
                self.bump_char();

                let escaped = match esc {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '\\' => '\\',
                    '"' => '"',
                    other => other,
                };
                value.push(escaped);
                continue;
            }

            value.push(c);
        }

        Err(Error::syntax("unterminated string literal", pos))
    }

    fn skip_ignored(&mut self) {
        loop {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.bump_char();
            }

            if self.peek_char() == Some('/') && self.peek_nth_char(1) == Some('/') {
                while let Some(c) = self.peek_char() {
                    self.bump_char();
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            break;
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_nth_char(&self, n: usize) -> Option<char> {
        self.input[self.position..].chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
