//! Progress reports produced by resolution passes.

/// Counts from a single resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Oracle calls made during the pass.
    pub attempted: usize,
    /// Recipes that became resolved.
    pub resolved: usize,
    /// Resolutions that produced an item not seen before.
    pub new_items: usize,
    pub empty: usize,
    pub failed: usize,
}

impl PassReport {
    /// A pass makes progress when at least one recipe resolved.
    pub fn made_progress(&self) -> bool {
        self.resolved > 0
    }
}

/// Every pass of one fixed-point run, in order. The last pass made no progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedPointReport {
    pub passes: Vec<PassReport>,
}

impl FixedPointReport {
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Total recipes resolved across all passes.
    pub fn resolved(&self) -> usize {
        self.passes.iter().map(|p| p.resolved).sum()
    }

    pub fn new_items(&self) -> usize {
        self.passes.iter().map(|p| p.new_items).sum()
    }

    pub fn failed(&self) -> usize {
        self.passes.iter().map(|p| p.failed).sum()
    }
}
