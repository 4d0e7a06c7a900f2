//! Error types for verstamp-content

/// Result type for verstamp-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in verstamp-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed semantic version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    #[error("Malformed build identifier '{input}': expected YYYYMMDDHHMM or {sentinel}")]
    MalformedBuildId { input: String, sentinel: &'static str },

    #[error("Failed to parse {format} content: {message}")]
    Parse { format: String, message: String },

    #[error("Invalid component name '{name}': expected a lowerCamelCase identifier")]
    InvalidComponent { name: String },
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }
}
