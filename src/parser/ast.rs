use std::fmt::Display;

use crate::catalog::schema::Column;

/// A literal as it appears in SQL text. Numeric literals stay unparsed so
/// that the integer-versus-decimal decision is deferred until the target
/// column type is known.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(String),
    String(String),
    Boolean(bool),
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(raw) => write!(f, "{}", raw),
            Self::String(s) => write!(f, "'{}'", s),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "!="),
            Self::Less => write!(f, "<"),
            Self::LessEq => write!(f, "<="),
            Self::Greater => write!(f, ">"),
            Self::GreaterEq => write!(f, ">="),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// a column name, possibly dotted as "table.column"
    Identifier(String),
    Literal(Literal),
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub on: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    /// projected field names; `["*"]` selects every column
    pub fields: Vec<String>,
    pub join: Option<JoinClause>,
    pub filter: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    CreateIndex {
        name: String,
        table: String,
        column: String,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Literal>,
    },
    Select(SelectStatement),
    Update {
        table: String,
        assignments: Vec<(String, Literal)>,
        filter: Option<Expr>,
    },
    Delete {
        table: String,
        filter: Option<Expr>,
    },
}
