//! Command implementations for verstamp-cli

pub mod backup;
pub mod check;
pub mod query;
pub mod sync;

pub use backup::{run_backups, run_cleanup, run_restore};
pub use check::{run_check, run_classify};
pub use query::{run_get, run_get_build, run_get_semantic, run_info, run_validate};
pub use sync::print_report;
