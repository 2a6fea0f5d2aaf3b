//! Index build configuration.

/// Configuration applied when indexes are created through the factory or
/// the table-index registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Upper bound on the estimated size of a single index (`None` = unlimited).
    pub memory_budget: Option<usize>,

    /// Maximum number of key columns in a composite index.
    pub max_key_columns: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            memory_budget: None,
            max_key_columns: 16,
        }
    }
}

impl IndexConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-index memory budget in bytes.
    #[must_use]
    pub const fn memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = Some(bytes);
        self
    }

    /// Removes the memory budget.
    #[must_use]
    pub const fn unlimited_memory(mut self) -> Self {
        self.memory_budget = None;
        self
    }

    /// Sets the maximum number of composite key columns.
    #[must_use]
    pub const fn max_key_columns(mut self, columns: usize) -> Self {
        self.max_key_columns = columns;
        self
    }

    /// Returns true if an index of `estimated` bytes fits the budget.
    #[must_use]
    pub fn fits_budget(&self, estimated: usize) -> bool {
        self.memory_budget.map_or(true, |budget| estimated <= budget)
    }
}
