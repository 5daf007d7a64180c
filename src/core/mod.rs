pub mod backup;
pub mod checker;
pub mod commands;
pub mod dedup;
pub mod engine;
pub mod events;
pub mod generator;
pub mod ledger;
pub mod state;

#[cfg(test)]
pub(crate) mod mocks;

pub use crate::domain::model::{CheckOutcome, Command, GenerationStrategy, ScanEvent, Snapshot};
pub use crate::domain::ports::{AvailabilityAuthority, BackupSync, LogStorage};
pub use crate::utils::error::Result;
