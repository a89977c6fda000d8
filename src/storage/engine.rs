use std::path::PathBuf;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::Result;
use crate::storage::heap::HeapFile;
use crate::storage::pager::Pager;

/// Hands out the heap file backing each table, opening pagers lazily.
/// Each table is stored as `<name>.data` inside the data directory; a data
/// file without a catalog entry is simply never opened.
pub struct Engine {
    data_dir: PathBuf,
    heaps: DashMap<String, Arc<HeapFile>>,
}

impl Engine {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            heaps: DashMap::new(),
        }
    }

    pub fn get_heap_file(&self, table_name: &str) -> Result<Arc<HeapFile>> {
        match self.heaps.entry(table_name.to_owned()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(vacant) => {
                let path = self.data_dir.join(format!("{}.data", table_name));
                let pager = Pager::open(path)?;
                let heap = Arc::new(HeapFile::new(pager));
                vacant.insert(Arc::clone(&heap));
                Ok(heap)
            }
        }
    }

    /// Flushes every open heap to disk. Dropping the engine closes the
    /// underlying files.
    pub fn close(&self) -> Result<()> {
        for entry in self.heaps.iter() {
            entry.value().sync()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::Engine;

    #[test]
    fn heap_files_are_shared_per_table() -> Result<()> {
        let dir = tempdir()?;
        let engine = Engine::new(dir.path());

        let first = engine.get_heap_file("accounts")?;
        let second = engine.get_heap_file("accounts")?;
        assert!(std::sync::Arc::ptr_eq(&first, &second));

        let rid = first.insert(b"row")?;
        assert_eq!(second.read_tuple(rid)?, Some(b"row".to_vec()));

        assert!(dir.path().join("accounts.data").exists());
        engine.close()?;

        Ok(())
    }
}
