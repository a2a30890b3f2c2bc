//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },
    
    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },
    
    #[error("Parse error: {message}")]
    ParseError { message: String },
    
    #[error("Write error: {message}")]
    WriteError { message: String },
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub fn parse(message: impl Into<String>) -> Self {
        IoError::ParseError { message: message.into() }
    }
}

impl From<IoError> for roomcrate_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(io) => roomcrate_core::Error::Io(io),
            IoError::ParseError { message } => roomcrate_core::Error::Parse(message),
            IoError::InvalidFormat { format } => roomcrate_core::Error::UnsupportedFormat(format),
            other => roomcrate_core::Error::InvalidData(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::ParseError { message: e.to_string() }
    }
}
