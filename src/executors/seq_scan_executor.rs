use std::sync::Arc;

use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::Result;
use crate::storage::heap::{HeapFile, HeapIterator};
use crate::tuple::{deserialize_tuple, Tuple};

/// Scans the whole heap in page-major, slot-minor order.
pub struct SeqScanExecutor {
    heap: Arc<HeapFile>,
    schema: Schema,
    iter: Option<HeapIterator>,
}

impl SeqScanExecutor {
    pub fn new(heap: Arc<HeapFile>, schema: Schema) -> Self {
        Self {
            heap,
            schema,
            iter: None,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        let iter = match self.iter.as_mut() {
            Some(iter) => iter,
            None => return Ok(None),
        };

        match iter.next()? {
            None => Ok(None),
            Some((bytes, rid)) => {
                let mut tuple = deserialize_tuple(&bytes, &self.schema)?;
                tuple.rid = Some(rid);
                Ok(Some(tuple))
            }
        }
    }
}

impl Executor for SeqScanExecutor {
    fn open(&mut self) -> Result<()> {
        self.iter = Some(Arc::clone(&self.heap).iter());
        Ok(())
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.iter = None;
        Ok(())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use crate::executors::tests::TestDb;

    #[test]
    fn scans_yield_rows_in_insertion_order() {
        let db = TestDb::new();
        db.execute("create table numbers (n INT)").unwrap();
        db.execute("insert into numbers values (1)").unwrap();
        db.execute("insert into numbers values (2)").unwrap();
        db.execute("insert into numbers values (3)").unwrap();

        let rows = db.execute("select * from numbers").unwrap();
        let values: Vec<i64> = rows.iter().map(|t| t.as_int(0)).collect();
        assert_eq!(values, vec![1, 2, 3]);

        // storage-originated tuples carry their rid
        assert!(rows.iter().all(|t| t.rid.is_some()));
    }

    #[test]
    fn scan_schema_is_qualified_with_the_table_name() {
        let db = TestDb::new();
        db.execute("create table numbers (n INT)").unwrap();
        db.execute("insert into numbers values (7)").unwrap();

        let rows = db.execute("select * from numbers where numbers.n = 7").unwrap();
        assert_eq!(rows.len(), 1);
    }
}
