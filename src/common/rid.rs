//! Row identifier type.

use std::fmt;

use crate::common::PageId;

/// Identifies a row in a table heap: the page holding it plus the slot
/// within that page.
///
/// Executors treat rids as opaque handles; only the table heap interprets
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rid {
    pub page_id: u32,
    pub slot: u32,
}

impl Rid {
    #[inline]
    pub fn new(page_id: u32, slot: u32) -> Self {
        Rid { page_id, slot }
    }

    /// The rid of a row that does not exist anywhere.
    pub const INVALID: Rid = Rid {
        page_id: PageId::INVALID.0,
        slot: 0,
    };
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rid({}, {})", self.page_id, self.slot)
    }
}
