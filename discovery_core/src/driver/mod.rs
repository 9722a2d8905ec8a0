//! Driver - seeds the dataset and runs discovery rounds.
//!
//! Each round expands the frontier, resolves to a fixed point, and saves a
//! snapshot. A snapshot that cannot be saved stops the run.

mod config;

pub use config::*;

use crafting_rules::{CraftingDataset, DatasetError};
use thiserror::Error;
use tracing::{info, info_span};

use crate::engine::{DiscoveryEngine, EngineConfig};
use crate::oracle::Oracle;
use crate::run::RunId;
use crate::snapshot::{SnapshotError, SnapshotMeta, SnapshotStore};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(
        "round {round}: failed to persist snapshot with {items} items and {recipes} recipes: {source}"
    )]
    Persist {
        round: u32,
        items: usize,
        recipes: usize,
        #[source]
        source: SnapshotError,
    },

    #[error("failed to resume from snapshot: {0}")]
    Resume(#[source] SnapshotError),

    #[error("round {round}: dataset invariant violated: {source}")]
    Dataset {
        round: u32,
        #[source]
        source: DatasetError,
    },
}

/// Counts reported at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based, continuing from a resumed snapshot.
    pub round: u32,
    pub items: usize,
    pub recipes: usize,
    pub resolved_recipes: usize,
    /// Recipes created by this round's expansion.
    pub new_recipes: usize,
    pub passes: usize,
}

impl std::fmt::Display for RoundReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Iteration {}: Items: {}, Recipes: {}",
            self.round, self.items, self.recipes
        )
    }
}

/// Runs a configured number of discovery rounds.
pub struct Driver<O> {
    config: DiscoveryConfig,
    engine: DiscoveryEngine<O>,
    store: SnapshotStore,
    run_id: RunId,
    rounds_done: u32,
}

impl<O: Oracle> Driver<O> {
    /// Build a driver, resuming from the configured snapshot if asked to.
    ///
    /// Seed items are always registered; on a resumed dataset that already
    /// holds them this changes nothing.
    pub fn new(config: DiscoveryConfig, oracle: O) -> Result<Self, DriverError> {
        let store = SnapshotStore::new(config.snapshot_path.clone());
        let run_id = RunId::new();

        let mut dataset = CraftingDataset::new();
        let mut rounds_done = 0;
        if config.resume {
            if let Some(snapshot) = store.load().map_err(DriverError::Resume)? {
                rounds_done = snapshot.meta.map_or(0, |meta| meta.round);
                info!(
                    path = ?store.path(),
                    rounds_done,
                    items = snapshot.dataset.item_count(),
                    recipes = snapshot.dataset.recipe_count(),
                    "resuming from snapshot"
                );
                dataset = snapshot.dataset;
            }
        }

        for seed in &config.seed_items {
            dataset.items.insert_base(&seed.name, &seed.glyph);
        }

        let engine_config = EngineConfig {
            inter_pass_delay: config.inter_call_delay(),
        };

        Ok(Self {
            engine: DiscoveryEngine::new(oracle, dataset, engine_config),
            config,
            store,
            run_id,
            rounds_done,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn dataset(&self) -> &CraftingDataset {
        self.engine.dataset()
    }

    pub fn engine(&self) -> &DiscoveryEngine<O> {
        &self.engine
    }

    /// Run one round: expansion, fixed-point resolution, snapshot.
    pub fn run_round(&mut self) -> Result<RoundReport, DriverError> {
        let round = self.rounds_done + 1;
        let span = info_span!("round", run_id = %self.run_id, round);
        let _enter = span.enter();

        let new_recipes = self
            .engine
            .generate_valid_recipes()
            .map_err(|source| DriverError::Dataset { round, source })?;
        let fixed_point = self
            .engine
            .process_recipes()
            .map_err(|source| DriverError::Dataset { round, source })?;

        let dataset = self.engine.dataset();
        let meta = SnapshotMeta {
            run_id: self.run_id,
            round,
        };
        self.store
            .save(dataset, &meta)
            .map_err(|source| DriverError::Persist {
                round,
                items: dataset.item_count(),
                recipes: dataset.recipe_count(),
                source,
            })?;
        self.rounds_done = round;

        let report = RoundReport {
            round,
            items: dataset.item_count(),
            recipes: dataset.recipe_count(),
            resolved_recipes: dataset.recipes.resolved_count(),
            new_recipes,
            passes: fixed_point.pass_count(),
        };
        info!(
            items = report.items,
            recipes = report.recipes,
            resolved = report.resolved_recipes,
            new_items = fixed_point.new_items(),
            failed_calls = fixed_point.failed(),
            passes = report.passes,
            "round finished"
        );
        Ok(report)
    }

    /// Run every configured round, stopping at the first fatal error.
    pub fn run(&mut self) -> Result<Vec<RoundReport>, DriverError> {
        (0..self.config.round_count)
            .map(|_| self.run_round())
            .collect()
    }
}
