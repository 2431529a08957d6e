//! Error types for symspeak

use std::io;
use thiserror::Error;

/// Main error type for symspeak
#[derive(Error, Debug)]
pub enum SymspeakError {
    /// The host has no text-to-speech capability at all
    #[error("Text-to-speech not supported on this system")]
    Unsupported,

    /// The engine reported an error while speaking an utterance
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for symspeak operations
pub type Result<T> = std::result::Result<T, SymspeakError>;

impl From<String> for SymspeakError {
    fn from(s: String) -> Self {
        SymspeakError::Other(s)
    }
}

impl From<&str> for SymspeakError {
    fn from(s: &str) -> Self {
        SymspeakError::Other(s.to_string())
    }
}
