use std::sync::{Arc, Mutex};

use crate::common::{PageId, Rid, SlotId};
use crate::error::{DbError, Result};
use crate::storage::page::{SlottedPage, MAX_TUPLE_SIZE};
use crate::storage::pager::{Page, Pager};

/// An unordered collection of tuples spread across slotted pages.
///
/// The heap owns its pager. All tuple-level operations take the per-heap
/// mutex so that read-modify-write of a page is atomic. The separate
/// `write_lock` is not taken here; it serializes the whole
/// check-insert-index-update envelope of the modifying executors, which
/// spans several heap calls.
pub struct HeapFile {
    pager: Pager,
    mutex: Mutex<()>,
    write_lock: Mutex<()>,
}

impl HeapFile {
    pub fn new(pager: Pager) -> Self {
        Self {
            pager,
            mutex: Mutex::new(()),
            write_lock: Mutex::new(()),
        }
    }

    /// Serializes constraint checking, heap insertion and index updates of
    /// every statement modifying this table.
    pub fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    /// Appends a serialized tuple, trying the last page first and
    /// allocating a new page when it is full. Returns the new tuple's rid.
    pub fn insert(&self, data: &[u8]) -> Result<Rid> {
        if data.len() > MAX_TUPLE_SIZE {
            return Err(DbError::TupleTooLarge(data.len()));
        }

        let _guard = self.mutex.lock().unwrap();

        let count = self.pager.page_count()?;
        let mut page = if count > 0 {
            self.pager.read_page(count - 1)?
        } else {
            Page::new(0)
        };

        let inserted = SlottedPage::new(&mut page.data).insert_tuple(data);
        let slot_id = match inserted {
            Ok(slot_id) => slot_id,
            Err(DbError::PageFull) => {
                page = Page::new(count);
                SlottedPage::new(&mut page.data).insert_tuple(data)?
            }
            Err(e) => return Err(e),
        };

        page.dirty = true;
        self.pager.write_page(&mut page)?;

        Ok((page.id, slot_id))
    }

    /// Reads a tuple's bytes; None signals a tombstoned slot.
    pub fn read_tuple(&self, rid: Rid) -> Result<Option<Vec<u8>>> {
        let _guard = self.mutex.lock().unwrap();

        let (page_id, slot_id) = rid;
        let mut page = self.pager.read_page(page_id)?;
        let slotted = SlottedPage::new(&mut page.data);
        Ok(slotted.get_tuple(slot_id)?.map(|bytes| bytes.to_vec()))
    }

    /// Tombstones the slot and writes the page back.
    pub fn delete_tuple(&self, rid: Rid) -> Result<()> {
        let _guard = self.mutex.lock().unwrap();

        let (page_id, slot_id) = rid;
        let mut page = self.pager.read_page(page_id)?;
        SlottedPage::new(&mut page.data).delete_tuple(slot_id)?;
        page.dirty = true;
        self.pager.write_page(&mut page)
    }

    pub fn page_count(&self) -> Result<PageId> {
        self.pager.page_count()
    }

    pub fn sync(&self) -> Result<()> {
        self.pager.sync()
    }

    pub fn iter(self: Arc<Self>) -> HeapIterator {
        HeapIterator {
            heap: self,
            cur_page: 0,
            cur_slot: 0,
        }
    }
}

/// A stateful cursor over the heap, yielding live tuples in page-major,
/// slot-minor order and skipping tombstones.
pub struct HeapIterator {
    heap: Arc<HeapFile>,
    cur_page: PageId,
    cur_slot: SlotId,
}

impl HeapIterator {
    pub fn next(&mut self) -> Result<Option<(Vec<u8>, Rid)>> {
        let _guard = self.heap.mutex.lock().unwrap();

        let page_count = self.heap.pager.page_count()?;
        while self.cur_page < page_count {
            let mut page = self.heap.pager.read_page(self.cur_page)?;
            let slotted = SlottedPage::new(&mut page.data);
            let slots = slotted.slot_count();

            while self.cur_slot < slots {
                let slot = self.cur_slot;
                self.cur_slot += 1;
                if let Some(bytes) = slotted.get_tuple(slot)? {
                    return Ok(Some((bytes.to_vec(), (self.cur_page, slot))));
                }
            }

            self.cur_page += 1;
            self.cur_slot = 0;
        }

        Ok(None)
    }
}
