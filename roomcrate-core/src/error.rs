//! Error types for roomcrate

use thiserror::Error;

/// Main error type for roomcrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("Parse error: {0}")]
    Parse(String),
    
    #[error("Storage error: {0}")]
    Storage(String),
    
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for roomcrate operations
pub type Result<T> = std::result::Result<T, Error>;
