//! Source revision lookup for verstamp
//!
//! Only local, read-only queries are made. Callers treat every failure as
//! "revision unknown".

pub mod error;
pub mod revision;

pub use error::{Error, Result};
pub use revision::{short_revision, DEFAULT_ABBREV};
