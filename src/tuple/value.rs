use std::fmt::Display;

use crate::catalog::schema::{Column, ColumnType};
use crate::error::{DbError, Result};
use crate::parser::ast::Literal;
use crate::storage::utils::{Deserializer, Serializer};

/// One typed cell of a tuple. DECIMAL carries its canonical decimal text
/// form; there is no lossy floating point anywhere in the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Str(String),
    Decimal(String),
    Bool(bool),
    Timestamp(i64),
}

impl Value {
    /// Returns how many bytes the serialized value occupies.
    pub fn size(&self) -> usize {
        match self {
            Value::Int(_) | Value::Timestamp(_) => std::mem::size_of::<i64>(),
            Value::Bool(_) => 1,
            Value::Str(val) | Value::Decimal(val) => {
                std::mem::size_of::<u16>() + val.as_bytes().len()
            }
        }
    }

    pub(crate) fn serialize_value(&self, serializer: &mut Serializer) {
        match self {
            Value::Int(val) | Value::Timestamp(val) => serializer.serialize_i64(*val),
            Value::Bool(val) => serializer.serialize_u8(*val as u8),
            Value::Str(val) | Value::Decimal(val) => {
                serializer.serialize_u16(val.as_bytes().len() as u16);
                serializer.copy_bytes(val.as_bytes());
            }
        }
    }

    pub(crate) fn parse_value(deserializer: &mut Deserializer, column: &Column) -> Value {
        match column.column_type {
            ColumnType::Int => Value::Int(deserializer.deserialize_i64()),
            ColumnType::Timestamp => Value::Timestamp(deserializer.deserialize_i64()),
            ColumnType::Bool => Value::Bool(deserializer.deserialize_u8() == 1),
            ColumnType::String => Value::Str(read_text(deserializer)),
            ColumnType::Decimal => Value::Decimal(read_text(deserializer)),
        }
    }

    /// Materializes a literal into a typed cell for insertion.
    pub fn cast_literal(literal: &Literal, target: ColumnType) -> Result<Value> {
        match (literal, target) {
            (Literal::Number(raw), ColumnType::Int) => {
                if raw.contains('.') {
                    return Err(DbError::type_mismatch_with_hint(
                        format!("invalid input syntax for type INT: \"{}\"", raw),
                        "INT literals cannot contain a decimal point.",
                    ));
                }
                raw.parse::<i64>().map(Value::Int).map_err(|_| {
                    DbError::type_mismatch(format!(
                        "invalid input syntax for type INT: \"{}\"",
                        raw
                    ))
                })
            }
            (Literal::Number(raw), ColumnType::Decimal) => Ok(Value::Decimal(raw.clone())),
            (Literal::Number(raw), ColumnType::String) => Ok(Value::Str(raw.clone())),
            (Literal::String(val), ColumnType::String) => Ok(Value::Str(val.clone())),
            (Literal::String(val), ColumnType::Decimal) => Ok(Value::Decimal(val.clone())),
            (Literal::Boolean(val), ColumnType::Bool) => Ok(Value::Bool(*val)),
            (literal, target) => Err(DbError::type_mismatch(format!(
                "incompatible types: expected {}, got {}",
                target, literal
            ))),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(val) => *val,
            _ => unreachable!(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(val) => val,
            _ => unreachable!(),
        }
    }

    pub fn as_decimal(&self) -> &str {
        match self {
            Value::Decimal(val) => val,
            _ => unreachable!(),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(val) => *val,
            _ => unreachable!(),
        }
    }
}

fn read_text(deserializer: &mut Deserializer) -> String {
    let length = deserializer.deserialize_u16() as usize;
    std::str::from_utf8(deserializer.read_bytes(length))
        .unwrap()
        .to_owned()
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(val) => Display::fmt(val, f),
            Value::Str(val) => Display::fmt(val, f),
            Value::Decimal(val) => Display::fmt(val, f),
            Value::Bool(val) => Display::fmt(val, f),
            Value::Timestamp(val) => Display::fmt(val, f),
        }
    }
}
