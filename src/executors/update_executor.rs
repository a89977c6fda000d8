use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;

use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::{DbError, Result};
use crate::indexing::{index_key, HashIndex};
use crate::parser::ast::Literal;
use crate::storage::heap::HeapFile;
use crate::tuple::value::Value;
use crate::tuple::{serialize_tuple, Tuple};

/// Rewrites each incoming tuple with the assigned values, inserts the new
/// version and then tombstones the old rid. Inserting first means a
/// failure in between leaves at most a duplicate, never a lost row. The
/// victim set is collected before the first write; the scan must never
/// see the versions this statement itself inserts, or a row whose filter
/// column is untouched would be rewritten again on every pass. Every
/// index on the table has the old pair removed and the new pair added.
pub struct UpdateExecutor {
    heap: Arc<HeapFile>,
    child: Box<dyn Executor>,
    table: String,
    assignments: Vec<(String, Literal)>,
    resolved: Vec<(usize, Value)>,
    victims: VecDeque<Tuple>,
    drained: bool,
    indexes: Arc<DashMap<String, Arc<HashIndex>>>,
}

impl UpdateExecutor {
    pub fn new(
        heap: Arc<HeapFile>,
        child: Box<dyn Executor>,
        table: String,
        assignments: Vec<(String, Literal)>,
        indexes: Arc<DashMap<String, Arc<HashIndex>>>,
    ) -> Self {
        Self {
            heap,
            child,
            table,
            assignments,
            resolved: Vec::new(),
            victims: VecDeque::new(),
            drained: false,
            indexes,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        if !self.drained {
            while let Some(tuple) = self.child.next().transpose()? {
                self.victims.push_back(tuple);
            }
            self.drained = true;
        }

        let old = match self.victims.pop_front() {
            Some(tuple) => tuple,
            None => return Ok(None),
        };
        let old_rid = match old.rid {
            Some(rid) => rid,
            None => unreachable!("update source tuples always originate from storage"),
        };

        let mut values = old.values().to_vec();
        for (idx, value) in &self.resolved {
            values[*idx] = value.clone();
        }
        let mut updated = Tuple::new(values);
        let data = serialize_tuple(&updated);

        let _guard = self.heap.write_lock().lock().unwrap();

        let new_rid = self.heap.insert(&data)?;
        self.heap.delete_tuple(old_rid)?;

        for (idx, column) in self.child.schema().columns().iter().enumerate() {
            let key = index_key(&self.table, &column.name);
            if let Some(index) = self.indexes.get(&key) {
                index.delete(&old.values()[idx], old_rid);
                index.insert(updated.values()[idx].clone(), new_rid);
            }
        }

        updated.rid = Some(new_rid);
        Ok(Some(updated))
    }
}

impl Executor for UpdateExecutor {
    fn open(&mut self) -> Result<()> {
        self.child.open()?;
        self.victims.clear();
        self.drained = false;

        self.resolved.clear();
        for (name, literal) in &self.assignments {
            let (idx, column) = self
                .child
                .schema()
                .find_column(name)
                .ok_or_else(|| DbError::ColumnMissing(name.clone()))?;
            let value = Value::cast_literal(literal, column.column_type)?;
            self.resolved.push((idx, value));
        }

        Ok(())
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::executors::tests::TestDb;

    #[test]
    fn can_execute_update_statements() {
        let db = TestDb::new();
        db.execute("create table items (name STRING, count INT)").unwrap();
        db.execute("insert into items values ('foo', 0)").unwrap();
        db.execute("insert into items values ('bar', 2)").unwrap();

        let updated = db
            .execute("update items set count = 1 where name = 'foo'")
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].as_int(1), 1);

        let mut rows = db.execute("select * from items").unwrap();
        rows.sort_by_key(|t| t.as_int(1));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_str(0), "foo");
        assert_eq!(rows[0].as_int(1), 1);
        assert_eq!(rows[1].as_str(0), "bar");
    }

    #[test]
    fn assigned_literals_are_cast_to_the_column_type() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();
        db.execute("insert into t values (1, 10.50)").unwrap();

        // the filter column is untouched; the row must still be rewritten
        // exactly once
        db.execute("update t set amt = 20.00 where id = 1").unwrap();
        let rows = db.execute("select * from t").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_decimal(1), "20.00");

        let err = db.execute("update t set id = 1.5").unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));

        let err = db.execute("update t set missing = 1").unwrap_err();
        assert!(matches!(err, DbError::ColumnMissing(_)));
    }

    #[test]
    fn updates_move_index_entries_to_the_new_rid() {
        let db = TestDb::new();
        db.execute("create table t (id INT, amt DECIMAL)").unwrap();
        db.execute("insert into t values (1, 10.50)").unwrap();
        db.execute("create index idx_t_id on t (id)").unwrap();

        db.execute("update t set id = 2 where id = 1").unwrap();

        let index = db.planner.index("t", "id").unwrap();
        assert_eq!(index.len(), 1);

        let rows = db.execute("select * from t where id = 2").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(db.execute("select * from t where id = 1").unwrap().is_empty());
    }
}
