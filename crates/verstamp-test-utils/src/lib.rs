//! Shared test fixtures for the verstamp workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`git`]: git repositories with and without history
//! - [`project`]: [`project::TestProject`], a temporary product checkout
//!   holding every version representation

pub mod git;
pub mod project;
