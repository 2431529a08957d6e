//! Speech engine abstraction
//!
//! An engine speaks utterances and reports progress back through a
//! channel. The playback service owns exactly one engine; nothing else
//! talks to it, which is how a single utterance at a time is enforced.

use super::voice::Utterance;
use crate::{Result, SymspeakError};
use log::info;
use std::sync::mpsc::Sender;

/// Progress reported by an engine for one utterance
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Speech reached this character offset of the utterance text
    Boundary { char_index: usize },
    /// The utterance finished or was cancelled
    End,
    /// The engine gave up on the utterance
    Error(String),
}

/// An engine event tagged with the utterance it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub token: u64,
    pub event: EngineEvent,
}

impl TaggedEvent {
    pub fn new(token: u64, event: EngineEvent) -> Self {
        Self { token, event }
    }
}

/// Where engines deliver their events
pub type EventSender = Sender<TaggedEvent>;

/// Text-to-speech engine trait
///
/// Events must be sent in the order they happen; boundary offsets for one
/// utterance never decrease.
pub trait SpeechEngine: Send {
    /// Register the channel events are delivered to
    fn subscribe(&mut self, events: EventSender);

    /// Start speaking an utterance
    fn enqueue(&mut self, utterance: Utterance) -> Result<()>;

    /// Cancel the active utterance, if any
    fn cancel(&mut self) -> Result<()>;

    /// Whether the engine is producing speech right now
    fn is_speaking(&self) -> bool;

    /// Whether this engine sends `End` on its own
    ///
    /// Playback falls back to polling `is_speaking` for engines that don't.
    fn reports_end(&self) -> bool {
        true
    }
}

/// Create the platform speech engine
///
/// Uses the native backend (Speech Dispatcher on Linux, AVFoundation on
/// macOS, SAPI/WinRT on Windows). Returns `Unsupported` when it cannot be
/// initialized, so callers can fall back to a playback without speech.
pub fn create_engine() -> Result<Box<dyn SpeechEngine>> {
    let platform = std::env::consts::OS;
    info!("Creating native speech engine for platform: {}", platform);

    use super::backends::native::NativeEngine;

    match NativeEngine::new() {
        Ok(engine) => {
            info!("✓ Successfully initialized native TTS backend");
            Ok(Box::new(engine))
        }
        Err(e) => {
            info!("✗ Native TTS backend unavailable: {}", e);
            if platform == "linux" {
                info!("To install: sudo apt install speech-dispatcher");
            }
            Err(SymspeakError::Unsupported)
        }
    }
}
