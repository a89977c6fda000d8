pub type PageId = u32;
pub type SlotId = u16;

/// Record identifier: the page a tuple lives on and its slot within that
/// page. Stable for the lifetime of the slot; deletion tombstones the slot
/// instead of reclaiming it.
pub type Rid = (PageId, SlotId);

pub const PAGE_SIZE: usize = 4096;
