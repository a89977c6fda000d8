use std::iter::Peekable;
use std::vec::IntoIter;

use self::ast::{
    BinaryOperator, Expr, JoinClause, Literal, SelectStatement, Statement,
};
use self::token::{tokenize, Keyword, Token};
use crate::catalog::schema::{Column, ColumnType};
use crate::error::{DbError, Result};

pub mod ast;
mod token;

pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn new(sql: &str) -> Result<Self> {
        let tokens = tokenize(sql)?;
        Ok(Self {
            tokens: tokens.into_iter().peekable(),
        })
    }

    fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => token,
            None => Token::End,
        }
    }

    fn peek_token(&mut self) -> &Token {
        match self.tokens.peek() {
            Some(token) => token,
            None => &Token::End,
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.next_token() {
            Token::Keyword(keyword) => match keyword {
                Keyword::Create => self.parse_create_statement(),
                Keyword::Insert => self.parse_insert_statement(),
                Keyword::Select => self.parse_select_statement(),
                Keyword::Update => self.parse_update_statement(),
                Keyword::Delete => self.parse_delete_statement(),
                found => self.wrong_keyword("a statement", found)?,
            },
            found => self.wrong_token("a statement", found)?,
        }
    }

    fn parse_create_statement(&mut self) -> Result<Statement> {
        match self.next_token() {
            Token::Keyword(Keyword::Table) => self.parse_create_table_statement(),
            Token::Keyword(Keyword::Index) => self.parse_create_index_statement(),
            found => self.wrong_token("TABLE or INDEX after CREATE", found)?,
        }
    }

    fn parse_create_table_statement(&mut self) -> Result<Statement> {
        let name = self.parse_identifier()?;

        self.expect(Token::LeftParen)?;
        let mut columns = vec![];
        loop {
            columns.push(self.parse_column_definition()?);

            let comma = if self.peek_token() == &Token::Comma {
                self.next_token();
                true
            } else {
                false
            };

            if self.peek_token() == &Token::RightParen {
                self.next_token();
                break;
            } else if !comma {
                let token = self.next_token();
                self.wrong_token("')' or ',' after a column definition", token)?;
            }
        }

        Ok(Statement::CreateTable { name, columns })
    }

    fn parse_column_definition(&mut self) -> Result<Column> {
        let name = self.parse_identifier()?;
        let column_type = self.parse_column_type()?;
        let mut column = Column::new(name, column_type);

        loop {
            match self.peek_token() {
                Token::Keyword(Keyword::Primary) => {
                    self.next_token();
                    self.expect(Token::Keyword(Keyword::Key))?;
                    column.is_primary = true;
                }
                Token::Keyword(Keyword::Unique) => {
                    self.next_token();
                    column.is_unique = true;
                }
                _ => break,
            }
        }

        Ok(column)
    }

    fn parse_column_type(&mut self) -> Result<ColumnType> {
        let column_type = match self.next_token() {
            Token::Keyword(keyword) => match keyword {
                Keyword::Int => ColumnType::Int,
                Keyword::String => ColumnType::String,
                Keyword::Decimal => ColumnType::Decimal,
                Keyword::Bool => ColumnType::Bool,
                Keyword::Timestamp => ColumnType::Timestamp,
                found => self.wrong_keyword("a column type", found)?,
            },
            found => self.wrong_token("a column type", found)?,
        };

        Ok(column_type)
    }

    fn parse_create_index_statement(&mut self) -> Result<Statement> {
        let name = self.parse_identifier()?;
        self.expect(Token::Keyword(Keyword::On))?;
        let table = self.parse_identifier()?;

        self.expect(Token::LeftParen)?;
        let column = self.parse_identifier()?;
        self.expect(Token::RightParen)?;

        Ok(Statement::CreateIndex {
            name,
            table,
            column,
        })
    }

    fn parse_insert_statement(&mut self) -> Result<Statement> {
        self.expect(Token::Keyword(Keyword::Into))?;
        let table = self.parse_identifier()?;

        let mut columns = vec![];
        if self.peek_token() == &Token::LeftParen {
            self.next_token();
            loop {
                columns.push(self.parse_identifier()?);
                match self.next_token() {
                    Token::Comma => continue,
                    Token::RightParen => break,
                    found => self.wrong_token("',' or ')' in a column list", found)?,
                }
            }
        }

        self.expect(Token::Keyword(Keyword::Values))?;
        self.expect(Token::LeftParen)?;
        let mut values = vec![];
        loop {
            values.push(self.parse_literal()?);
            match self.next_token() {
                Token::Comma => continue,
                Token::RightParen => break,
                found => self.wrong_token("',' or ')' in a value list", found)?,
            }
        }

        Ok(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    fn parse_select_statement(&mut self) -> Result<Statement> {
        let mut fields = vec![];
        loop {
            if self.peek_token() == &Token::Star {
                self.next_token();
                fields.push("*".to_owned());
            } else {
                fields.push(self.parse_column_name()?);
            }

            if self.peek_token() == &Token::Comma {
                self.next_token();
            } else {
                break;
            }
        }

        self.expect(Token::Keyword(Keyword::From))?;
        let table = self.parse_identifier()?;

        let join = if self.peek_token() == &Token::Keyword(Keyword::Join) {
            self.next_token();
            let join_table = self.parse_identifier()?;
            self.expect(Token::Keyword(Keyword::On))?;
            let on = self.parse_comparison()?;
            Some(JoinClause {
                table: join_table,
                on,
            })
        } else {
            None
        };

        let filter = self.parse_optional_where()?;

        Ok(Statement::Select(SelectStatement {
            table,
            fields,
            join,
            filter,
        }))
    }

    fn parse_update_statement(&mut self) -> Result<Statement> {
        let table = self.parse_identifier()?;
        self.expect(Token::Keyword(Keyword::Set))?;

        let mut assignments = vec![];
        loop {
            let column = self.parse_identifier()?;
            self.expect(Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push((column, value));

            if self.peek_token() == &Token::Comma {
                self.next_token();
            } else {
                break;
            }
        }

        let filter = self.parse_optional_where()?;

        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }

    fn parse_delete_statement(&mut self) -> Result<Statement> {
        self.expect(Token::Keyword(Keyword::From))?;
        let table = self.parse_identifier()?;
        let filter = self.parse_optional_where()?;

        Ok(Statement::Delete { table, filter })
    }

    fn parse_optional_where(&mut self) -> Result<Option<Expr>> {
        if self.peek_token() == &Token::Keyword(Keyword::Where) {
            self.next_token();
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }

    /// Parses AND/OR chains over single comparisons, left-associatively.
    fn parse_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek_token() {
                Token::Keyword(Keyword::And) => BinaryOperator::And,
                Token::Keyword(Keyword::Or) => BinaryOperator::Or,
                _ => break,
            };
            self.next_token();
            let right = self.parse_term()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let left = self.parse_simple_expr()?;

        if let Some(op) = comparison_operator(self.peek_token()) {
            self.next_token();
            let right = self.parse_simple_expr()?;
            return Ok(Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_simple_expr()?;

        let op = match comparison_operator(self.peek_token()) {
            Some(op) => op,
            None => {
                let token = self.next_token();
                self.wrong_token("a comparison operator", token)?
            }
        };
        self.next_token();
        let right = self.parse_simple_expr()?;

        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_simple_expr(&mut self) -> Result<Expr> {
        match self.peek_token() {
            Token::Identifier(_) => Ok(Expr::Identifier(self.parse_column_name()?)),
            _ => Ok(Expr::Literal(self.parse_literal()?)),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.next_token() {
            Token::Number(raw) => Ok(Literal::Number(raw)),
            Token::QuotedString(val) => Ok(Literal::String(val)),
            Token::Keyword(Keyword::True) => Ok(Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => Ok(Literal::Boolean(false)),
            found => self.wrong_token("a literal", found)?,
        }
    }

    /// Parses a column name, combining `table . column` into one dotted
    /// name.
    fn parse_column_name(&mut self) -> Result<String> {
        let mut name = self.parse_identifier()?;
        if self.peek_token() == &Token::Dot {
            self.next_token();
            let column = self.parse_identifier()?;
            name = format!("{}.{}", name, column);
        }
        Ok(name)
    }

    fn parse_identifier(&mut self) -> Result<String> {
        match self.next_token() {
            Token::Identifier(s) => Ok(s),
            found => self.wrong_token("an identifier", found)?,
        }
    }

    fn expect(&mut self, expected_token: Token) -> Result<()> {
        let token = self.next_token();
        if token != expected_token {
            self.wrong_token(&format!("{:?}", expected_token), token)?
        } else {
            Ok(())
        }
    }

    fn wrong_token<T>(&self, expected: &str, found: Token) -> Result<T> {
        Err(DbError::Syntax(format!(
            "expected {}, but found: {:?}",
            expected, found
        )))
    }

    fn wrong_keyword<T>(&self, expected: &str, found: Keyword) -> Result<T> {
        Err(DbError::Syntax(format!(
            "expected {}, but found: {:?}",
            expected, found
        )))
    }
}

fn comparison_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::Eq => BinaryOperator::Eq,
        Token::NotEq => BinaryOperator::NotEq,
        Token::Less => BinaryOperator::Less,
        Token::LessEq => BinaryOperator::LessEq,
        Token::Greater => BinaryOperator::Greater,
        Token::GreaterEq => BinaryOperator::GreaterEq,
        _ => return None,
    };
    Some(op)
}

pub fn parse_sql(sql: &str) -> Result<Statement> {
    let mut parser = Parser::new(sql)?;
    parser.parse_statement()
}
