use std::sync::Arc;

use dashmap::DashMap;

use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::{ConstraintKind, DbError, Result};
use crate::indexing::{index_key, HashIndex};
use crate::parser::ast::Literal;
use crate::storage::heap::HeapFile;
use crate::tuple::value::Value;
use crate::tuple::{deserialize_tuple, serialize_tuple, Tuple};

/// Casts each row's literals into typed cells, enforces primary-key and
/// unique constraints, writes the tuple to the heap and adds it to every
/// index on the table, yielding the inserted tuple with its new rid.
///
/// The whole check-insert-index-update sequence runs under the heap's
/// shared write lock, so two statements inserting the same key cannot both
/// pass their checks.
pub struct InsertExecutor {
    heap: Arc<HeapFile>,
    rows: Vec<Vec<Literal>>,
    schema: Schema,
    table: String,
    indexes: Arc<DashMap<String, Arc<HashIndex>>>,
    pos: usize,
}

struct ConstraintCheck {
    col_idx: usize,
    kind: ConstraintKind,
    name: String,
    key: String,
}

impl InsertExecutor {
    pub fn new(
        heap: Arc<HeapFile>,
        rows: Vec<Vec<Literal>>,
        schema: Schema,
        table: String,
        indexes: Arc<DashMap<String, Arc<HashIndex>>>,
    ) -> Self {
        Self {
            heap,
            rows,
            schema,
            table,
            indexes,
            pos: 0,
        }
    }

    fn build_tuple(&self, row: &[Literal]) -> Result<Tuple> {
        if row.len() != self.schema.len() {
            return Err(DbError::type_mismatch(format!(
                "expected {} values, got {}",
                self.schema.len(),
                row.len()
            )));
        }

        let mut values = Vec::with_capacity(row.len());
        for (literal, column) in row.iter().zip(self.schema.columns()) {
            let value = Value::cast_literal(literal, column.column_type).map_err(|err| {
                match err {
                    DbError::TypeMismatch { message, hint } => DbError::TypeMismatch {
                        message: format!("column {}: {}", column.name, message),
                        hint,
                    },
                    other => other,
                }
            })?;
            values.push(value);
        }

        Ok(Tuple::new(values))
    }

    /// Indexed constrained columns are probed through their index; if any
    /// constrained column has no index, one heap scan checks the rest by
    /// value equality.
    fn check_constraints(&self, tuple: &Tuple) -> Result<()> {
        let mut checks = vec![];
        for (idx, column) in self.schema.columns().iter().enumerate() {
            if column.is_primary || column.is_unique {
                checks.push(ConstraintCheck {
                    col_idx: idx,
                    kind: if column.is_primary {
                        ConstraintKind::PrimaryKey
                    } else {
                        ConstraintKind::Unique
                    },
                    name: column.name.clone(),
                    key: index_key(&self.table, &column.name),
                });
            }
        }

        if checks.is_empty() {
            return Ok(());
        }

        let mut needs_scan = false;
        for check in &checks {
            match self.indexes.get(&check.key) {
                Some(index) => {
                    if !index.get(&tuple.values()[check.col_idx]).is_empty() {
                        return Err(DbError::ConstraintViolation {
                            column: check.name.clone(),
                            kind: check.kind,
                        });
                    }
                }
                None => needs_scan = true,
            }
        }

        if !needs_scan {
            return Ok(());
        }

        let mut iter = Arc::clone(&self.heap).iter();
        while let Some((bytes, _rid)) = iter.next()? {
            let existing = deserialize_tuple(&bytes, &self.schema)?;
            for check in &checks {
                if tuple.values()[check.col_idx] == existing.values()[check.col_idx] {
                    return Err(DbError::ConstraintViolation {
                        column: check.name.clone(),
                        kind: check.kind,
                    });
                }
            }
        }

        Ok(())
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        if self.pos >= self.rows.len() {
            return Ok(None);
        }

        let mut tuple = self.build_tuple(&self.rows[self.pos])?;
        self.pos += 1;

        let _guard = self.heap.write_lock().lock().unwrap();

        self.check_constraints(&tuple)?;

        let data = serialize_tuple(&tuple);
        let rid = self.heap.insert(&data)?;

        for (value, column) in tuple.values().iter().zip(self.schema.columns()) {
            let key = index_key(&self.table, &column.name);
            if let Some(index) = self.indexes.get(&key) {
                index.insert(value.clone(), rid);
            }
        }

        tuple.rid = Some(rid);
        Ok(Some(tuple))
    }
}

impl Executor for InsertExecutor {
    fn open(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ConstraintKind, DbError};
    use crate::executors::tests::TestDb;

    #[test]
    fn inserted_rows_carry_their_rid() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();

        let rows = db.execute("insert into t values (1, 10.50)").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rid, Some((0, 0)));
    }

    #[test]
    fn bad_casts_do_not_touch_the_heap() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();

        let err = db.execute("insert into t values (1.5, 10)").unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));

        assert_eq!(db.execute("select * from t").unwrap().len(), 0);
    }

    #[test]
    fn value_count_must_match_the_schema() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();

        let err = db.execute("insert into t values (1)").unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));
    }

    #[test]
    fn duplicate_primary_keys_are_rejected_without_an_index() {
        let db = TestDb::new();
        db.execute("create table t (id INT PRIMARY KEY, amt DECIMAL)").unwrap();
        db.execute("insert into t values (1, 10.50)").unwrap();

        let err = db.execute("insert into t values (1, 20.00)").unwrap_err();
        match err {
            DbError::ConstraintViolation { column, kind } => {
                assert_eq!(column, "id");
                assert_eq!(kind, ConstraintKind::PrimaryKey);
            }
            other => panic!("expected a constraint violation, got {:?}", other),
        }

        assert_eq!(db.execute("select * from t").unwrap().len(), 1);
    }

    #[test]
    fn duplicate_unique_values_are_rejected_via_the_index() {
        let db = TestDb::new();
        db.execute("create table u (id INT PRIMARY KEY, email STRING UNIQUE)").unwrap();
        db.execute("create index idx_u_email on u (email)").unwrap();
        db.execute("insert into u values (1, 'a@b.com')").unwrap();

        let err = db
            .execute("insert into u values (2, 'a@b.com')")
            .unwrap_err();
        match err {
            DbError::ConstraintViolation { column, kind } => {
                assert_eq!(column, "email");
                assert_eq!(kind, ConstraintKind::Unique);
            }
            other => panic!("expected a constraint violation, got {:?}", other),
        }

        // heap and index stayed unchanged
        assert_eq!(db.execute("select * from u").unwrap().len(), 1);
        assert_eq!(db.planner.index("u", "email").unwrap().len(), 1);
    }

    #[test]
    fn inserts_maintain_every_index_on_the_table() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();
        db.execute("create index idx_t_id on t (id)").unwrap();

        db.execute("insert into t values (1, 10.50)").unwrap();
        db.execute("insert into t values (2, 20.00)").unwrap();

        let index = db.planner.index("t", "id").unwrap();
        assert_eq!(index.len(), 2);

        // an index-backed lookup sees the freshly inserted row
        let rows = db.execute("select * from t where id = 2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_decimal(1), "20.00");
    }

    #[test]
    fn decimal_uniqueness_is_textual() {
        let db = TestDb::new();
        db.execute("create table t (amt DECIMAL UNIQUE)").unwrap();
        db.execute("insert into t values (10.50)").unwrap();

        let err = db.execute("insert into t values (10.50)").unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        // a different text form is a different value to the constraint
        db.execute("insert into t values (10.5)").unwrap();
    }
}
