use crate::error::OrderError;

/// Default quantity suggested for the next split step.
///
/// Suggests 2 kg while more than 2 kg remain, otherwise the whole remainder.
pub fn propose(remaining: u32) -> u32 {
    if remaining > 2 { 2 } else { remaining }
}

/// Validate `requested` against `remaining` and return the new remainder.
pub fn allocate(remaining: u32, requested: u32) -> Result<u32, OrderError> {
    if requested < 1 || requested > remaining {
        return Err(OrderError::OutOfRange {
            requested,
            remaining,
        });
    }
    Ok(remaining - requested)
}

/// Tracks the shrinking kilogram budget while an order is split into
/// line items. Owned by one configuration run and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityAllocator {
    total: u32,
    remaining: u32,
}

impl QuantityAllocator {
    /// Start with the whole `total` unallocated.
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Monthly total being split, in kilograms.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Kilograms not yet assigned to a line item.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Kilograms already assigned.
    pub fn allocated(&self) -> u32 {
        self.total - self.remaining
    }

    /// True once every kilogram is allocated. No further step is offered.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Less than 30% of the total is left.
    pub fn is_running_low(&self) -> bool {
        u64::from(self.remaining) * 10 < u64::from(self.total) * 3
    }

    /// Suggested size of the next step, see [`propose`].
    pub fn propose(&self) -> u32 {
        propose(self.remaining)
    }

    /// Consume `requested` kilograms. On error the remainder is untouched.
    pub fn allocate(&mut self, requested: u32) -> Result<u32, OrderError> {
        self.remaining = allocate(self.remaining, requested)?;
        Ok(self.remaining)
    }
}
