//! # Crafting Rules
//!
//! The data model of the crafting graph: items, the recipes that combine them,
//! and the dataset that holds both. This crate performs no I/O and knows
//! nothing about the oracle; it is the single source of truth for what has
//! been discovered so far.

pub mod dataset;
pub mod items;
pub mod recipes;

pub use dataset::*;
pub use items::*;
pub use recipes::*;
