//! Tolerant SQL lexer for statement drafts.
//!
//! The lexer never fails. Unknown characters are skipped and unterminated
//! strings, quoted identifiers and block comments simply run to the end of
//! the input, so half-typed drafts still produce a usable token stream.

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Table,
    If,
    Not,
    Exists,
    Insert,
    Into,
    Values,
    From,
    Update,
    Delete,
    Drop,
    Select,
    Where,
    As,
    Primary,
    Foreign,
    Constraint,
    Key,
    Unique,
    Check,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Star,

    // End of input
    Eof,
}

impl Token {
    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            Token::Ident(_)
                | Token::Str(_)
                | Token::Num(_)
                | Token::LParen
                | Token::RParen
                | Token::Comma
                | Token::Semicolon
                | Token::Dot
                | Token::Star
                | Token::Eof
        )
    }
}

/// A token together with the byte range of the draft it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

impl Lexeme {
    /// Word spelled by this lexeme: identifier content, or the source text of a keyword.
    pub fn word<'s>(&'s self, source: &'s str) -> Option<&'s str> {
        match &self.token {
            Token::Ident(name) => Some(name.as_str()),
            t if t.is_keyword() => source.get(self.span.clone()),
            _ => None,
        }
    }
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices().peekable();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    /// Byte offset of the current character, or the input length at the end.
    fn offset(&self) -> usize {
        self.current.map_or(self.input.len(), |(i, _)| i)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip /
        self.advance(); // skip *
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '*' && self.current_char() == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Reads a quoted run, honouring a doubled closing quote as an escape.
    fn read_quoted(&mut self, close: char) -> String {
        self.advance(); // skip opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char() {
            if c == close {
                if self.peek() == Some(close) {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    break;
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "IF" => Token::If,
            "NOT" => Token::Not,
            "EXISTS" => Token::Exists,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "FROM" => Token::From,
            "UPDATE" => Token::Update,
            "DELETE" => Token::Delete,
            "DROP" => Token::Drop,
            "SELECT" => Token::Select,
            "WHERE" => Token::Where,
            "AS" => Token::As,
            "PRIMARY" => Token::Primary,
            "FOREIGN" => Token::Foreign,
            "CONSTRAINT" => Token::Constraint,
            "KEY" => Token::Key,
            "UNIQUE" => Token::Unique,
            "CHECK" => Token::Check,
            _ => Token::Ident(s),
        }
    }

    pub fn next_lexeme(&mut self) -> Lexeme {
        loop {
            self.skip_whitespace();
            let start = self.offset();

            let token = match self.current_char() {
                None => Token::Eof,

                Some('-') => {
                    if self.peek() == Some('-') {
                        self.skip_line_comment();
                        continue;
                    } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        Token::Num(self.read_number())
                    } else {
                        self.advance();
                        continue;
                    }
                }

                Some('/') => {
                    if self.peek() == Some('*') {
                        self.skip_block_comment();
                    } else {
                        self.advance();
                    }
                    continue;
                }

                Some('(') => {
                    self.advance();
                    Token::LParen
                }
                Some(')') => {
                    self.advance();
                    Token::RParen
                }
                Some(',') => {
                    self.advance();
                    Token::Comma
                }
                Some(';') => {
                    self.advance();
                    Token::Semicolon
                }
                Some('.') => {
                    self.advance();
                    Token::Dot
                }
                Some('*') => {
                    self.advance();
                    Token::Star
                }

                Some('"') => Token::Ident(self.read_quoted('"')),
                Some('`') => Token::Ident(self.read_quoted('`')),
                Some('[') => Token::Ident(self.read_quoted(']')),
                Some('\'') => Token::Str(self.read_quoted('\'')),

                Some(c) if c.is_ascii_digit() => Token::Num(self.read_number()),

                Some(c) if c.is_alphabetic() || c == '_' => {
                    Self::keyword_or_ident(self.read_identifier())
                }

                Some(_) => {
                    self.advance();
                    continue;
                }
            };

            return Lexeme {
                token,
                span: start..self.offset(),
            };
        }
    }

    /// Collect all lexemes, always terminated by `Eof`.
    pub fn tokenize(mut self) -> Vec<Lexeme> {
        let mut lexemes = Vec::new();
        loop {
            let lexeme = self.next_lexeme();
            let done = lexeme.token == Token::Eof;
            lexemes.push(lexeme);
            if done {
                break;
            }
        }
        lexemes
    }
}

/// Tokenize a draft.
pub fn tokenize(input: &str) -> Vec<Lexeme> {
    Lexer::new(input).tokenize()
}
