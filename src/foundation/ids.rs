use std::sync::atomic::{AtomicU32, Ordering};

/// Process-wide monotonic identifiers.
///
/// Used to tag resource kinds: each kind draws one id at first use and keeps it for the lifetime
/// of the process. `0` is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueId(pub(crate) u32);

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

impl UniqueId {
    /// Draw the next identifier.
    pub fn next() -> Self {
        let mut id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            // Wrapped around; skip the reserved value.
            id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        }
        Self(id)
    }

    /// Raw 32-bit value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
