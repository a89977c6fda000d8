use std::fs::{File, OpenOptions};
use std::os::unix::prelude::FileExt;
use std::path::Path;
use std::sync::Mutex;

use crate::common::{PageId, PAGE_SIZE};
use crate::error::Result;

pub struct Page {
    pub id: PageId,
    pub data: [u8; PAGE_SIZE],
    pub dirty: bool,
}

impl Page {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            data: [0u8; PAGE_SIZE],
            dirty: false,
        }
    }
}

/// Page-granular I/O over a single table file. The pager does not buffer;
/// every read and write touches the file, serialized by the mutex.
pub struct Pager {
    file: Mutex<File>,
}

impl Pager {
    /// Opens the table file for reading and writing, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Reads the page with the given id. Reading at or past the end of the
    /// file yields an all-zero page; a fresh slotted page is only ever
    /// obtained this way.
    pub fn read_page(&self, id: PageId) -> Result<Page> {
        let file = self.file.lock().unwrap();
        let mut page = Page::new(id);

        let size = file.metadata()?.len();
        let offset = id as u64 * PAGE_SIZE as u64;
        if offset < size {
            file.read_exact_at(&mut page.data, offset)?;
        }

        Ok(page)
    }

    /// Writes the page back to the file and marks it clean.
    pub fn write_page(&self, page: &mut Page) -> Result<()> {
        let file = self.file.lock().unwrap();
        let offset = page.id as u64 * PAGE_SIZE as u64;
        file.write_all_at(&page.data, offset)?;
        page.dirty = false;
        Ok(())
    }

    pub fn page_count(&self) -> Result<PageId> {
        let file = self.file.lock().unwrap();
        let size = file.metadata()?.len();
        Ok((size / PAGE_SIZE as u64) as PageId)
    }

    /// Flushes all written pages to disk. Dropping the pager closes the
    /// underlying file.
    pub fn sync(&self) -> Result<()> {
        let file = self.file.lock().unwrap();
        file.sync_all()?;
        Ok(())
    }
}
