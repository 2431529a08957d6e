//! symspeak - symbol-based communication with speech
//!
//! Users build sentences from pictographic symbols, undo and redo their
//! edits, and hear the sentence read aloud with the spoken symbol
//! highlighted as speech progresses.

pub mod analytics;
pub mod catalog;
pub mod command;
pub mod editor;
pub mod error;
pub mod goals;
pub mod history;
pub mod library;
pub mod phrases;
pub mod speech;
pub mod state;
pub mod store;
pub mod symbol;

pub use error::{Result, SymspeakError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Program name used in file names and the banner
pub const APP_NAME: &str = "symspeak";
