//! Construction-time configuration for `PhpArray`.

use crate::error::ArrayError;

pub const DEFAULT_INITIAL_CAPACITY: usize = 4;

/// Options fixed when a `PhpArray` is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayOptions {
    initial_capacity: usize,
    reset_cursor_on_insert: bool,
}

impl ArrayOptions {
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            reset_cursor_on_insert: true,
        }
    }

    /// Starting table size; the table never shrinks below it.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// When set, inserting a new key rewinds the `each` cursor to the head.
    pub fn with_reset_cursor_on_insert(mut self, reset: bool) -> Self {
        self.reset_cursor_on_insert = reset;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn reset_cursor_on_insert(&self) -> bool {
        self.reset_cursor_on_insert
    }

    pub fn validate(&self) -> Result<(), ArrayError> {
        if self.initial_capacity == 0 {
            return Err(ArrayError::ZeroCapacity);
        }
        Ok(())
    }

    pub(crate) fn clamped(mut self) -> Self {
        self.initial_capacity = self.initial_capacity.max(1);
        self
    }
}

impl Default for ArrayOptions {
    fn default() -> Self {
        Self::new()
    }
}
