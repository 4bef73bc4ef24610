use thiserror::Error;

/// Result type for classcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised during class analysis
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed class unit: {message}")]
    MalformedUnit { message: String },
}

impl Error {
    /// Create a malformed-unit error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedUnit { message: message.into() }
    }
}
