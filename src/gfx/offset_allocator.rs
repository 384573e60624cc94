//! Offset Allocator
//!
//! Sub-allocates byte ranges out of a fixed-size region. Free space is kept
//! as an ordered map of `offset -> size`; allocation is best-fit and freed
//! ranges are coalesced with both neighbours.

use std::collections::BTreeMap;

/// A live range handed out by [`OffsetAllocator::allocate`].
///
/// Not `Clone`: returning it to [`OffsetAllocator::free`] consumes it, so a
/// range cannot be freed twice.
#[derive(Debug, PartialEq, Eq)]
pub struct Allocation {
    pub offset: u64,
    pub size: u64,
    /// Bytes reserved in front of `offset` to satisfy alignment.
    padding: u64,
}

#[derive(Debug, Clone)]
pub struct OffsetAllocator {
    capacity: u64,
    used: u64,
    free_ranges: BTreeMap<u64, u64>,
}

impl OffsetAllocator {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let mut free_ranges = BTreeMap::new();
        if capacity > 0 {
            free_ranges.insert(0, capacity);
        }
        Self {
            capacity,
            used: 0,
            free_ranges,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently handed out, alignment padding included.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    #[must_use]
    pub fn available(&self) -> u64 {
        self.capacity - self.used
    }

    /// Returns `None` when no free range can hold `size` bytes at `align`.
    pub fn allocate(&mut self, size: u64, align: u64) -> Option<Allocation> {
        let align = align.max(1);
        let size = size.max(1);

        let mut best: Option<(u64, u64, u64)> = None;
        for (&start, &len) in &self.free_ranges {
            let Some(aligned) = start.checked_next_multiple_of(align) else {
                continue;
            };
            let padding = aligned - start;
            if padding.checked_add(size).is_none_or(|taken| taken > len) {
                continue;
            }
            if best.is_none_or(|(_, best_len, _)| len < best_len) {
                best = Some((start, len, padding));
                if len == padding + size {
                    break;
                }
            }
        }

        let (start, len, padding) = best?;
        self.free_ranges.remove(&start);
        let taken = padding + size;
        if len > taken {
            self.free_ranges.insert(start + taken, len - taken);
        }
        self.used += taken;

        Some(Allocation {
            offset: start + padding,
            size,
            padding,
        })
    }

    pub fn free(&mut self, allocation: Allocation) {
        let mut start = allocation.offset - allocation.padding;
        let mut len = allocation.size + allocation.padding;
        self.used -= len;

        if let Some((&prev_start, &prev_len)) = self.free_ranges.range(..start).next_back()
            && prev_start + prev_len == start
        {
            self.free_ranges.remove(&prev_start);
            start = prev_start;
            len += prev_len;
        }
        if let Some(next_len) = self.free_ranges.remove(&(start + len)) {
            len += next_len;
        }
        self.free_ranges.insert(start, len);
    }

    /// Number of disjoint free ranges.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.free_ranges.len()
    }
}
