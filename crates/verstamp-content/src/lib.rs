//! Version record model and format adapters for verstamp
//!
//! The record types describe the single logical version of a product. The
//! handlers read and rewrite exactly the version-bearing parts of each
//! manifest format while leaving every other byte of the file alone.

pub mod build_id;
pub mod error;
pub mod format;
pub mod handlers;
pub mod record;
pub mod version;

pub use build_id::{BuildId, SENTINEL};
pub use error::{Error, Result};
pub use format::{Format, VersionFormat};
pub use handlers::{ConstantsHandler, DataFileHandler, ManifestHandler};
pub use record::{VersionFields, VersionRecord};
pub use version::{ChangeKind, SemanticVersion};
