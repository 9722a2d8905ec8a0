//! Discovery Engine - grows the crafting graph against an oracle.
//!
//! A discovery round works in two phases:
//! 1. **Expansion**: every unordered pair of known items that has no recipe yet
//!    gets an unresolved recipe
//! 2. **Resolution**: unresolved recipes are sent to the oracle, pass after
//!    pass, until a pass resolves nothing
//!
//! Items found during resolution only join the frontier at the next expansion.

mod report;

pub use report::*;

use crafting_rules::{CraftingDataset, DatasetError, Resolution};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::oracle::{Oracle, ResolutionOutcome, DEFAULT_REQUEST_DELAY};

/// Configuration for the discovery engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause between two resolution passes of the same fixed-point run.
    pub inter_pass_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inter_pass_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Owns the dataset for the duration of a run and drives the oracle over it.
pub struct DiscoveryEngine<O> {
    oracle: O,
    dataset: CraftingDataset,
    config: EngineConfig,
}

impl<O: Oracle> DiscoveryEngine<O> {
    /// Create an engine over an existing dataset.
    pub fn new(oracle: O, dataset: CraftingDataset, config: EngineConfig) -> Self {
        Self {
            oracle,
            dataset,
            config,
        }
    }

    pub fn dataset(&self) -> &CraftingDataset {
        &self.dataset
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Consume the engine, handing back the dataset.
    pub fn into_dataset(self) -> CraftingDataset {
        self.dataset
    }

    /// Create an unresolved recipe for every pair of distinct items that has none.
    ///
    /// Each ordered pair is checked against the whole recipe set, so `(A, B)`
    /// and `(B, A)` yield a single recipe. Returns the number created.
    pub fn generate_valid_recipes(&mut self) -> Result<usize, DatasetError> {
        let names = self.dataset.items.names();
        let mut created = 0;

        for first in &names {
            for second in &names {
                if first == second {
                    continue;
                }
                if !self.dataset.recipes.exists(first, second) {
                    self.dataset.create_recipe(first, second)?;
                    created += 1;
                }
            }
        }

        debug!(
            created,
            items = self.dataset.item_count(),
            recipes = self.dataset.recipe_count(),
            "expanded frontier"
        );
        Ok(created)
    }

    /// Ask the oracle once about every recipe that is unresolved at the start
    /// of the pass.
    ///
    /// `Empty` and `Failed` outcomes leave the recipe unresolved; it is not
    /// asked again until the next pass.
    pub fn resolution_pass(&mut self) -> Result<PassReport, DatasetError> {
        let mut report = PassReport::default();

        for key in self.dataset.recipes.unresolved_keys() {
            report.attempted += 1;

            match self.oracle.resolve(&key.first, &key.second) {
                ResolutionOutcome::Found { result, glyph } => {
                    let resolution = self.dataset.record_resolution(&key, &result, &glyph)?;
                    report.resolved += 1;
                    if resolution == Resolution::NewItem {
                        report.new_items += 1;
                        info!(recipe = %key, "found new item: {glyph} {result}");
                    } else {
                        debug!(recipe = %key, result = %result, "found known item");
                    }
                }
                ResolutionOutcome::Empty => {
                    report.empty += 1;
                    debug!(recipe = %key, "no result");
                }
                ResolutionOutcome::Failed(err) => {
                    report.failed += 1;
                    warn!(recipe = %key, error = %err, "oracle call failed");
                }
            }
        }

        Ok(report)
    }

    /// Run resolution passes until one resolves nothing.
    pub fn process_recipes(&mut self) -> Result<FixedPointReport, DatasetError> {
        let mut report = FixedPointReport::default();

        loop {
            let pass = self.resolution_pass()?;
            debug!(
                pass = report.pass_count() + 1,
                attempted = pass.attempted,
                resolved = pass.resolved,
                failed = pass.failed,
                "resolution pass finished"
            );
            report.passes.push(pass);

            if !pass.made_progress() {
                break;
            }
            thread::sleep(self.config.inter_pass_delay);
        }

        Ok(report)
    }
}
