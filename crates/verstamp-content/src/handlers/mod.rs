//! Format adapters

mod constants;
mod data_file;
mod lines;
mod manifest;

pub use self::constants::{ConstantsHandler, TIMESTAMP_CONSTANT};
pub use self::data_file::DataFileHandler;
pub use self::manifest::ManifestHandler;
