//! Filesystem primitives for verstamp
//!
//! Provides normalized paths, atomic writes, checksums and the advisory
//! lock that serializes mutating invocations against one project.

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use error::{Error, Result};
pub use lock::InvocationLock;
pub use path::NormalizedPath;
