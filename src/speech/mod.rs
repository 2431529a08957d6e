//! Speech playback system

pub mod backends;
pub mod boundary;
pub mod engine;
pub mod playback;
pub mod voice;

pub use boundary::BoundaryTable;
pub use engine::{create_engine, EngineEvent, SpeechEngine, TaggedEvent};
pub use playback::{Completion, SpeechPlayback};
pub use voice::{Utterance, VoiceOptions, VoiceParams};
