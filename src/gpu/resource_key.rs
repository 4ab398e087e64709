use smallvec::SmallVec;

use crate::foundation::ids::UniqueId;

/// Ordered word sequence used to look up reusable GPU objects.
///
/// Two keys are equal iff their word sequences are equal. A key only classifies a resource for
/// lookup; it never identifies one instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecycleKey {
    words: SmallVec<[u32; 4]>,
}

impl RecycleKey {
    /// Empty key. Resources reporting an empty key are never recycled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key holding only a resource-kind tag.
    pub fn of_type(tag: UniqueId) -> Self {
        let mut key = Self::new();
        key.write_u32(tag.as_u32());
        key
    }

    /// Append one word.
    pub fn write_u32(&mut self, v: u32) {
        self.words.push(v);
    }

    /// Append a pointer-sized value as two words, low word first.
    pub fn write_usize(&mut self, v: usize) {
        self.write_u64(v as u64);
    }

    /// Append a 64-bit value as two words, low word first.
    pub fn write_u64(&mut self, v: u64) {
        self.words.push(v as u32);
        self.words.push((v >> 32) as u32);
    }

    /// Whether no word was written.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The raw words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/resource_key.rs"]
mod tests;
