use std::sync::Arc;

use super::Executor;
use crate::catalog::schema::Schema;
use crate::common::Rid;
use crate::error::Result;
use crate::indexing::HashIndex;
use crate::storage::heap::HeapFile;
use crate::tuple::value::Value;
use crate::tuple::{deserialize_tuple, Tuple};

/// Resolves one key through a hash index and reads the matching rids from
/// the heap. Rids whose slot has been tombstoned since the index was built
/// are skipped.
pub struct IndexScanExecutor {
    index: Arc<HashIndex>,
    heap: Arc<HeapFile>,
    key: Value,
    schema: Schema,
    rids: Vec<Rid>,
    pos: usize,
}

impl IndexScanExecutor {
    pub fn new(index: Arc<HashIndex>, heap: Arc<HeapFile>, key: Value, schema: Schema) -> Self {
        Self {
            index,
            heap,
            key,
            schema,
            rids: Vec::new(),
            pos: 0,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        while self.pos < self.rids.len() {
            let rid = self.rids[self.pos];
            self.pos += 1;

            if let Some(bytes) = self.heap.read_tuple(rid)? {
                let mut tuple = deserialize_tuple(&bytes, &self.schema)?;
                tuple.rid = Some(rid);
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
}

impl Executor for IndexScanExecutor {
    fn open(&mut self) -> Result<()> {
        self.rids = self.index.get(&self.key);
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.rids.clear();
        self.pos = 0;
        Ok(())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
