use self::value::Value;
use crate::catalog::schema::Schema;
use crate::common::Rid;
use crate::error::{DbError, Result};
use crate::storage::utils::{Deserializer, Serializer};

pub mod value;

/// One row, in memory. A tuple read from storage carries the rid of its
/// slot; a freshly constructed tuple has none until Insert returns one.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    pub rid: Option<Rid>,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self { rid: None, values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn as_int(&self, col_idx: usize) -> i64 {
        self.values[col_idx].as_int()
    }

    pub fn as_str(&self, col_idx: usize) -> &str {
        self.values[col_idx].as_str()
    }

    pub fn as_decimal(&self, col_idx: usize) -> &str {
        self.values[col_idx].as_decimal()
    }

    pub fn as_bool(&self, col_idx: usize) -> bool {
        self.values[col_idx].as_bool()
    }
}

/// Serializes a tuple: a big-endian u16 cell count followed by each cell
/// in column order (INT/TIMESTAMP 8 bytes, BOOL 1 byte, STRING/DECIMAL
/// u16 length prefix plus the raw bytes).
pub fn serialize_tuple(tuple: &Tuple) -> Vec<u8> {
    let size = 2 + tuple.values().iter().map(|val| val.size()).sum::<usize>();
    let mut buffer = vec![0u8; size];

    let mut serializer = Serializer::new(&mut buffer);
    serializer.serialize_u16(tuple.values().len() as u16);
    for value in tuple.values() {
        value.serialize_value(&mut serializer);
    }

    buffer
}

/// Decodes a serialized tuple against the schema that wrote it. The cell
/// count must equal the schema's column count.
pub fn deserialize_tuple(bytes: &[u8], schema: &Schema) -> Result<Tuple> {
    let mut deserializer = Deserializer::new(bytes);

    let cell_count = deserializer.deserialize_u16() as usize;
    if cell_count != schema.len() {
        return Err(DbError::SchemaMismatch {
            expected: schema.len(),
            found: cell_count,
        });
    }

    let mut values = Vec::with_capacity(cell_count);
    for column in schema.columns() {
        values.push(Value::parse_value(&mut deserializer, column));
    }

    Ok(Tuple::new(values))
}

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::value::Value;
    use super::{deserialize_tuple, serialize_tuple, Tuple};
    use crate::catalog::schema::{Column, ColumnType, Schema};
    use crate::error::DbError;

    lazy_static! {
        static ref TEST_SCHEMA: Schema = Schema::new(vec![
            Column::new("id", ColumnType::Int),
            Column::new("name", ColumnType::String),
            Column::new("balance", ColumnType::Decimal),
            Column::new("active", ColumnType::Bool),
            Column::new("created_at", ColumnType::Timestamp),
        ]);
    }

    fn sample_tuple() -> Tuple {
        Tuple::new(vec![
            Value::Int(-42),
            Value::Str("alice".to_owned()),
            Value::Decimal("10.50".to_owned()),
            Value::Bool(true),
            Value::Timestamp(1700000000),
        ])
    }

    #[test]
    fn serialization_roundtrips_every_type() {
        let tuple = sample_tuple();
        let bytes = serialize_tuple(&tuple);
        let restored = deserialize_tuple(&bytes, &TEST_SCHEMA).unwrap();
        assert_eq!(restored, tuple);

        assert_eq!(restored.as_int(0), -42);
        assert_eq!(restored.as_str(1), "alice");
        assert_eq!(restored.as_decimal(2), "10.50");
        assert!(restored.as_bool(3));
    }

    #[test]
    fn cell_count_is_length_prefixed() {
        let bytes = serialize_tuple(&sample_tuple());
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), 5);
        // 2 count + 8 int + (2 + 5) name + (2 + 5) balance + 1 bool + 8 ts
        assert_eq!(bytes.len(), 2 + 8 + 7 + 7 + 1 + 8);
    }

    #[test]
    fn mismatched_schema_is_rejected() {
        let narrow = Schema::new(vec![Column::new("id", ColumnType::Int)]);
        let bytes = serialize_tuple(&sample_tuple());
        let err = deserialize_tuple(&bytes, &narrow).unwrap_err();
        assert!(matches!(
            err,
            DbError::SchemaMismatch {
                expected: 1,
                found: 5
            }
        ));
    }
}
