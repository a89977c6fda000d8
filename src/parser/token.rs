use std::iter::{Enumerate, Peekable};
use std::str::{Chars, FromStr};

use crate::error::{DbError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    And,
    Bool,
    Create,
    Decimal,
    Delete,
    False,
    From,
    Index,
    Insert,
    Int,
    Into,
    Join,
    Key,
    On,
    Or,
    Primary,
    Select,
    Set,
    String,
    Table,
    Timestamp,
    True,
    Unique,
    Update,
    Values,
    Where,
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let res = match s {
            "and" => Self::And,
            "bool" => Self::Bool,
            "create" => Self::Create,
            "decimal" => Self::Decimal,
            "delete" => Self::Delete,
            "false" => Self::False,
            "from" => Self::From,
            "index" => Self::Index,
            "insert" => Self::Insert,
            "int" => Self::Int,
            "into" => Self::Into,
            "join" => Self::Join,
            "key" => Self::Key,
            "on" => Self::On,
            "or" => Self::Or,
            "primary" => Self::Primary,
            "select" => Self::Select,
            "set" => Self::Set,
            "string" => Self::String,
            "table" => Self::Table,
            "timestamp" => Self::Timestamp,
            "true" => Self::True,
            "unique" => Self::Unique,
            "update" => Self::Update,
            "values" => Self::Values,
            "where" => Self::Where,
            _ => return Err(()),
        };
        Ok(res)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// an SQL identifier; keeps the case it was written in
    Identifier(String),
    /// a keyword (e.g. SELECT), matched case-insensitively
    Keyword(Keyword),
    /// an unparsed numeric literal, possibly containing a dot
    Number(String),
    /// a single-quoted string
    QuotedString(String),
    /// Dot '.'
    Dot,
    /// Comma ','
    Comma,
    /// Left parenthesis '('
    LeftParen,
    /// Right parenthesis ')'
    RightParen,
    /// Semicolon ';'
    Semicolon,
    /// star '*'
    Star,
    /// Equal '='
    Eq,
    /// Not equal (either '!=' or '<>')
    NotEq,
    /// Less than '<'
    Less,
    /// Greater than '>'
    Greater,
    /// Less than or equal '<='
    LessEq,
    /// Greater than or equal '>='
    GreaterEq,
    /// not a token, just end of query
    End,
}

struct Tokenizer<'a> {
    sql: &'a str,
    chars: Peekable<Enumerate<Chars<'a>>>,
}

impl<'a> Tokenizer<'a> {
    fn new(sql: &'a str) -> Self {
        Self {
            sql,
            chars: sql.chars().enumerate().peekable(),
        }
    }

    fn word(&mut self, start: usize) -> &'a str {
        let mut end = start + 1;
        while let Some((pos, ch)) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || *ch == '_' {
                end = *pos + 1;
                self.chars.next();
            } else {
                break;
            }
        }
        &self.sql[start..end]
    }

    fn number(&mut self, start: usize) -> String {
        let mut end = start + 1;
        while let Some((pos, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() || *ch == '.' {
                end = *pos + 1;
                self.chars.next();
            } else {
                break;
            }
        }
        self.sql[start..end].to_owned()
    }

    fn quoted_string(&mut self, start: usize) -> Result<String> {
        for (pos, ch) in self.chars.by_ref() {
            if ch == '\'' {
                return Ok(self.sql[start..pos].to_owned());
            }
        }

        Err(DbError::Syntax(format!(
            "unterminated string literal {}",
            &self.sql[start..]
        )))
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let token = match self.chars.next() {
            Some((pos, ch)) => match ch {
                ch if ch.is_whitespace() => return self.next_token(),
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                ';' => Token::Semicolon,
                ',' => Token::Comma,
                '.' => Token::Dot,
                '*' => Token::Star,
                '=' => Token::Eq,
                '!' => match self.chars.peek() {
                    Some((_pos, '=')) => {
                        self.chars.next();
                        Token::NotEq
                    }
                    _ => return Err(DbError::Syntax("unexpected character '!'".to_owned())),
                },
                '<' => match self.chars.peek() {
                    Some((_pos, '>')) => {
                        self.chars.next();
                        Token::NotEq
                    }
                    Some((_pos, '=')) => {
                        self.chars.next();
                        Token::LessEq
                    }
                    _ => Token::Less,
                },
                '>' => match self.chars.peek() {
                    Some((_pos, '=')) => {
                        self.chars.next();
                        Token::GreaterEq
                    }
                    _ => Token::Greater,
                },
                '\'' => Token::QuotedString(self.quoted_string(pos + 1)?),
                'a'..='z' | 'A'..='Z' | '_' => {
                    let word = self.word(pos);
                    if let Ok(keyword) = Keyword::from_str(&word.to_lowercase()) {
                        Token::Keyword(keyword)
                    } else {
                        Token::Identifier(word.to_owned())
                    }
                }
                '0'..='9' => Token::Number(self.number(pos)),
                ch => return Err(DbError::Syntax(format!("unexpected character '{}'", ch))),
            },
            None => return Ok(None),
        };

        Ok(Some(token))
    }
}

pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let mut tokens = vec![];
    let mut tokenizer = Tokenizer::new(sql);
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
