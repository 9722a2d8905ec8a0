//! # Discovery Core
//!
//! Grows a crafting graph by pairing every known item with every other one
//! and asking an oracle what each pair makes. This crate drives the data model
//! from `crafting_rules` through repeated rounds until no new items appear.
//!
//! ## Core Components
//!
//! - **oracle**: The oracle contract and its HTTP client
//! - **engine**: Frontier expansion and fixed-point resolution
//! - **snapshot**: JSON persistence of the dataset between rounds
//! - **driver**: Configuration, seeding, and the round loop
//!
//! Everything runs on one thread. Oracle calls are paced by a fixed delay and
//! a failed call only leaves its recipe unresolved for a later pass.

pub mod driver;
pub mod engine;
pub mod oracle;
pub mod run;
pub mod snapshot;

pub use driver::*;
pub use engine::*;
pub use oracle::*;
pub use run::*;
pub use snapshot::*;
