//! Synchronization engine
//!
//! Every mutating command runs the same pipeline: validate the input, derive
//! the dependent fields, propagate the record to every representation, then
//! report what happened.

mod check;
mod engine;
mod report;

pub use check::{CheckReport, CheckStatus, DriftItem};
pub use engine::SyncEngine;
pub use report::{Operation, SyncOptions, SyncReport};
