//! Native Rust TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - WinRT/SAPI on Windows
//!
//! The tts crate has no word-boundary callbacks, so utterances spoken here
//! produce `End` events only and the highlight stays on the whole sentence.

use crate::speech::engine::{EngineEvent, EventSender, SpeechEngine, TaggedEvent};
use crate::speech::voice::{Utterance, VoiceParams};
use crate::{Result, SymspeakError};
use log::{debug, error, warn};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tts::{Features, Tts as TtsCrate, UtteranceId};

/// Maps platform utterance ids to playback tokens
///
/// End and stop callbacks arrive on a platform thread, possibly after the
/// utterance was cancelled or even before `speak` returned its id. Only an
/// id that is still tracked produces an event.
struct Tracker<K> {
    tokens: HashMap<K, u64>,
    /// Ids that ended before they were registered
    early: HashSet<K>,
}

impl<K: Eq + Hash> Tracker<K> {
    fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            early: HashSet::new(),
        }
    }

    /// Register a spoken utterance; true if it already ended
    fn started(&mut self, id: K, token: u64) -> bool {
        if self.early.remove(&id) {
            return true;
        }
        // Anything left over belongs to utterances that were cancelled
        self.early.clear();
        self.tokens.insert(id, token);
        false
    }

    /// Token of the utterance that just ended, if still tracked
    fn ended(&mut self, id: K) -> Option<u64> {
        let token = self.tokens.remove(&id);
        if token.is_none() {
            self.early.insert(id);
        }
        token
    }

    fn clear(&mut self) {
        self.tokens.clear();
        self.early.clear();
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

type SharedTracker = Arc<Mutex<Tracker<UtteranceId>>>;

/// Native TTS backend using the tts crate
pub struct NativeEngine {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Capabilities of the platform backend
    features: Features,

    /// Event channel, shared with the utterance callbacks
    events: Arc<Mutex<Option<EventSender>>>,

    /// Utterances in flight, by platform id
    pending: SharedTracker,

    /// Set when the platform gave no utterance id, so ends must be polled
    untracked: bool,

    /// Voice selected for the last utterance, to skip redundant switches
    selected: Option<(Option<String>, String)>,
}

impl NativeEngine {
    /// Create a new native TTS engine
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| SymspeakError::Speech(format!("Failed to initialize TTS: {}", e)))?;
        let features = tts.supported_features();

        let engine = Self {
            tts,
            features,
            events: Arc::new(Mutex::new(None)),
            pending: Arc::new(Mutex::new(Tracker::new())),
            untracked: false,
            selected: None,
        };

        if engine.features.utterance_callbacks {
            engine.install_callbacks()?;
        } else {
            warn!("Utterance callbacks not supported; end of speech will be polled");
        }

        debug!("Native TTS backend created successfully");
        Ok(engine)
    }

    /// Forward utterance end/stop notifications into the event channel
    fn install_callbacks(&self) -> Result<()> {
        let events = Arc::clone(&self.events);
        let pending = Arc::clone(&self.pending);
        self.tts
            .on_utterance_end(Some(Box::new(move |id| {
                notify_end(&events, &pending, id);
            })))
            .map_err(|e| SymspeakError::Speech(format!("Failed to set end callback: {}", e)))?;

        let events = Arc::clone(&self.events);
        let pending = Arc::clone(&self.pending);
        self.tts
            .on_utterance_stop(Some(Box::new(move |id| {
                notify_end(&events, &pending, id);
            })))
            .map_err(|e| SymspeakError::Speech(format!("Failed to set stop callback: {}", e)))?;

        Ok(())
    }

    /// Convert a rate multiplier (1.0 = normal) to the platform range
    fn convert_rate(&self, rate: f32) -> f32 {
        (self.tts.normal_rate() * rate).clamp(self.tts.min_rate(), self.tts.max_rate())
    }

    /// Convert a pitch multiplier (1.0 = normal) to the platform range
    fn convert_pitch(&self, pitch: f32) -> f32 {
        (self.tts.normal_pitch() * pitch).clamp(self.tts.min_pitch(), self.tts.max_pitch())
    }

    /// Convert volume (0.0-1.0) to the platform range
    fn convert_volume(&self, volume: f32) -> f32 {
        let (min, max) = (self.tts.min_volume(), self.tts.max_volume());
        min + (max - min) * volume.clamp(0.0, 1.0)
    }

    fn apply_voice(&mut self, params: &VoiceParams, language: &str) -> Result<()> {
        if self.features.rate {
            let rate = self.convert_rate(params.rate);
            self.tts
                .set_rate(rate)
                .map_err(|e| SymspeakError::Speech(format!("Failed to set rate: {}", e)))?;
        }
        if self.features.pitch {
            let pitch = self.convert_pitch(params.pitch);
            self.tts
                .set_pitch(pitch)
                .map_err(|e| SymspeakError::Speech(format!("Failed to set pitch: {}", e)))?;
        }
        if self.features.volume {
            let volume = self.convert_volume(params.volume);
            self.tts
                .set_volume(volume)
                .map_err(|e| SymspeakError::Speech(format!("Failed to set volume: {}", e)))?;
        }

        let wanted = (params.voice.clone(), language.to_string());
        if self.features.voice && self.selected.as_ref() != Some(&wanted) {
            self.select_voice(params.voice.as_deref(), language)?;
            self.selected = Some(wanted);
        }

        Ok(())
    }

    /// Pick a voice by name, else the first one speaking `language`
    fn select_voice(&mut self, name: Option<&str>, language: &str) -> Result<()> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| SymspeakError::Speech(format!("Failed to get voices: {}", e)))?;

        let by_name = name.and_then(|n| voices.iter().find(|v| v.name() == n));
        let by_language = || {
            voices
                .iter()
                .find(|v| v.language().to_string().starts_with(language))
        };

        match by_name.or_else(by_language) {
            Some(voice) => {
                debug!("Selecting voice: {}", voice.name());
                self.tts
                    .set_voice(voice)
                    .map_err(|e| SymspeakError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!(
                "No voice for {} (have {} voices); keeping the default",
                language,
                voices.len()
            ),
        }

        Ok(())
    }
}

/// Send `End` for the utterance `id`, if it is still tracked
fn notify_end<K: Eq + Hash>(events: &Mutex<Option<EventSender>>, pending: &Mutex<Tracker<K>>, id: K) {
    let token = match pending.lock() {
        Ok(mut tracker) => tracker.ended(id),
        Err(e) => {
            error!("Utterance tracker lock poisoned: {}", e);
            None
        }
    };
    match token {
        Some(token) => send_end(events, token),
        None => debug!("Ignoring end of an untracked utterance"),
    }
}

fn send_end(events: &Mutex<Option<EventSender>>, token: u64) {
    if let Ok(guard) = events.lock() {
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(TaggedEvent::new(token, EngineEvent::End));
        }
    }
}

impl SpeechEngine for NativeEngine {
    fn subscribe(&mut self, events: EventSender) {
        match self.events.lock() {
            Ok(mut guard) => *guard = Some(events),
            Err(e) => error!("Event channel lock poisoned: {}", e),
        }
    }

    fn enqueue(&mut self, utterance: Utterance) -> Result<()> {
        self.apply_voice(&utterance.voice, &utterance.language)?;

        debug!("Speaking: {}", utterance.text);
        let id = self.tts.speak(utterance.text, false).map_err(|e| {
            error!("Failed to speak: {}", e);
            SymspeakError::Speech(format!("Speak failed: {}", e))
        })?;

        let Some(id) = id else {
            if !self.untracked {
                warn!("Platform gave no utterance id; end of speech will be polled");
                self.untracked = true;
            }
            return Ok(());
        };
        let ended = match self.pending.lock() {
            Ok(mut tracker) => tracker.started(id, utterance.token),
            Err(e) => {
                return Err(SymspeakError::Speech(format!("Utterance tracker lock poisoned: {}", e)))
            }
        };
        if ended {
            send_end(&self.events, utterance.token);
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        if let Ok(mut tracker) = self.pending.lock() {
            tracker.clear();
        }
        if !self.features.stop {
            warn!("Stopping speech not supported on this platform");
            return Ok(());
        }
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            SymspeakError::Speech(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }

    fn is_speaking(&self) -> bool {
        if !self.features.is_speaking {
            return self.pending.lock().map(|t| !t.is_empty()).unwrap_or(false);
        }
        self.tts.is_speaking().unwrap_or(false)
    }

    fn reports_end(&self) -> bool {
        self.features.utterance_callbacks && !self.untracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_engine() {
        // May fail without speech-dispatcher (Linux) or audio in CI
        match NativeEngine::new() {
            Ok(_) => println!("✓ Native TTS backend initialized successfully"),
            Err(e) => println!("⚠ TTS initialization failed (may be expected in CI): {}", e),
        }
    }

    fn channel() -> (Mutex<Option<EventSender>>, std::sync::mpsc::Receiver<TaggedEvent>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (Mutex::new(Some(tx)), rx)
    }

    #[test]
    fn test_late_stop_of_cancelled_utterance_is_ignored() {
        let (events, rx) = channel();
        let pending = Mutex::new(Tracker::new());

        pending.lock().unwrap().started(11u64, 1);
        // Cancel, then start the next utterance
        pending.lock().unwrap().clear();
        pending.lock().unwrap().started(12u64, 2);

        // The platform reports the first utterance stopped only now
        notify_end(&events, &pending, 11u64);
        assert!(rx.try_recv().is_err());

        notify_end(&events, &pending, 12u64);
        assert_eq!(rx.try_recv().unwrap(), TaggedEvent::new(2, EngineEvent::End));
        assert!(pending.lock().unwrap().is_empty());

        // The stale id is forgotten once another utterance starts
        assert!(!pending.lock().unwrap().started(13u64, 3));
        assert!(pending.lock().unwrap().early.is_empty());
    }

    #[test]
    fn test_end_before_registration() {
        let (events, rx) = channel();
        let pending = Mutex::new(Tracker::new());

        notify_end(&events, &pending, 5u64);
        assert!(rx.try_recv().is_err());
        assert!(pending.lock().unwrap().started(5u64, 3));
        assert!(pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_volume_conversion() {
        if let Ok(engine) = NativeEngine::new() {
            let (min, max) = (engine.tts.min_volume(), engine.tts.max_volume());
            assert_eq!(engine.convert_volume(0.0), min);
            assert_eq!(engine.convert_volume(1.0), max);
            assert_eq!(engine.convert_volume(2.0), max);
        }
    }

    #[test]
    fn test_rate_conversion_is_clamped() {
        if let Ok(engine) = NativeEngine::new() {
            let rate = engine.convert_rate(100.0);
            assert!(rate <= engine.tts.max_rate());
            let rate = engine.convert_rate(0.0);
            assert!(rate >= engine.tts.min_rate());
        }
    }
}
