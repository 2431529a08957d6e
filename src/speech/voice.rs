//! Voice parameters and utterances

use serde::{Deserialize, Serialize};

/// Pitch used when none is given
pub const DEFAULT_PITCH: f32 = 1.0;
/// Rate used when none is given; slightly slower than normal
pub const DEFAULT_RATE: f32 = 0.9;
/// Volume used when none is given
pub const DEFAULT_VOLUME: f32 = 1.0;
/// Language tag for every utterance unless configured otherwise
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Caller-supplied voice settings; unset fields take defaults
///
/// Pitch and rate are multipliers around 1.0 (normal); volume runs
/// from 0.0 to 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,

    /// Preferred voice name (backend-specific)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl VoiceOptions {
    /// Fill unset fields with defaults
    pub fn resolve(&self) -> VoiceParams {
        VoiceParams {
            pitch: self.pitch.unwrap_or(DEFAULT_PITCH),
            rate: self.rate.unwrap_or(DEFAULT_RATE),
            volume: self.volume.unwrap_or(DEFAULT_VOLUME).clamp(0.0, 1.0),
            voice: self.voice.clone(),
        }
    }
}

/// Fully resolved voice parameters handed to an engine
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
    pub voice: Option<String>,
}

/// One request to the speech engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Identifies this utterance in engine events
    pub token: u64,
    pub text: String,
    pub voice: VoiceParams,
    pub language: String,
}
