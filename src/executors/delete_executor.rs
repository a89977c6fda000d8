use std::sync::Arc;

use dashmap::DashMap;

use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::Result;
use crate::indexing::{index_key, HashIndex};
use crate::storage::heap::HeapFile;
use crate::tuple::Tuple;

/// Tombstones each incoming tuple's rid and removes its (value, rid)
/// pairs from every index on the table, yielding the deleted tuple.
pub struct DeleteExecutor {
    heap: Arc<HeapFile>,
    child: Box<dyn Executor>,
    table: String,
    indexes: Arc<DashMap<String, Arc<HashIndex>>>,
}

impl DeleteExecutor {
    pub fn new(
        heap: Arc<HeapFile>,
        child: Box<dyn Executor>,
        table: String,
        indexes: Arc<DashMap<String, Arc<HashIndex>>>,
    ) -> Self {
        Self {
            heap,
            child,
            table,
            indexes,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        let tuple = match self.child.next().transpose()? {
            Some(tuple) => tuple,
            None => return Ok(None),
        };
        let rid = match tuple.rid {
            Some(rid) => rid,
            None => unreachable!("delete source tuples always originate from storage"),
        };

        let _guard = self.heap.write_lock().lock().unwrap();

        self.heap.delete_tuple(rid)?;

        for (idx, column) in self.child.schema().columns().iter().enumerate() {
            let key = index_key(&self.table, &column.name);
            if let Some(index) = self.indexes.get(&key) {
                index.delete(&tuple.values()[idx], rid);
            }
        }

        Ok(Some(tuple))
    }
}

impl Executor for DeleteExecutor {
    fn open(&mut self) -> Result<()> {
        self.child.open()
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
