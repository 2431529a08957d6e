//! Speech engine backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// In-memory engine driven by the host
pub mod scripted;
