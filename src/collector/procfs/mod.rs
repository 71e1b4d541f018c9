//! Readers for the Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading system and process
//! information from the `/proc` virtual filesystem.

pub mod parser;
pub mod process;
pub mod system;

pub use process::ProcessCollector;
pub use system::SystemCollector;

use parser::ParseError;

/// Error type for a failed read of one source.
///
/// Never leaves the tick: the collector logs it and substitutes the sentinel.
#[derive(Debug)]
pub enum CollectError {
    /// The source could not be opened or read.
    Io(std::io::Error),
    /// The source was read but lacks the structure the reader needs.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}
