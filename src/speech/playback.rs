//! Speech playback with per-unit highlighting
//!
//! `SpeechPlayback` owns the speech engine and at most one session. A
//! session covers one utterance from `speak` until the engine reports end
//! or error, or until `stop` cancels it. While it runs, engine boundary
//! events are mapped to symbol or word indices and handed to the caller's
//! callback; when it settles the callback gets `None` to clear the
//! highlight and the request's [`Completion`] receives the outcome.
//!
//! Engines deliver events through a channel. Nothing is dispatched until
//! the owner calls [`SpeechPlayback::pump`] or [`SpeechPlayback::wait`],
//! so every callback runs on the owner's thread.

use super::boundary::BoundaryTable;
use super::engine::{EngineEvent, SpeechEngine, TaggedEvent};
use super::voice::{Utterance, VoiceOptions, DEFAULT_LANGUAGE};
use crate::symbol::Symbol;
use crate::{Result, SymspeakError};
use log::{debug, error, info, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// How often `wait` wakes up to check on engines that don't report end
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time an engine gets to start speaking before silence counts as the end
const START_GRACE: Duration = Duration::from_millis(500);

/// Highlight callback: `Some(index)` while a unit is spoken, `None` to clear
pub type UnitCallback = Box<dyn FnMut(Option<usize>)>;

/// Runs once when a free-text utterance ends, fails or is stopped
pub type EndCallback = Box<dyn FnOnce()>;

/// Settle-once outcome of a speak request
#[must_use = "a completion reports whether speech finished or failed"]
pub struct Completion {
    token: u64,
    rx: Receiver<Result<()>>,
}

impl Completion {
    /// Token of the utterance this completion belongs to
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Take the outcome if the request has settled
    ///
    /// Returns `Some` exactly once.
    pub fn try_take(&self) -> Option<Result<()>> {
        self.rx.try_recv().ok()
    }
}

/// State of the utterance in flight
struct PlaybackSession {
    token: u64,
    boundaries: BoundaryTable,
    current: Option<usize>,
    cancelled: bool,
    started: Instant,
    on_unit: UnitCallback,
    on_end: Option<EndCallback>,
    settle: Sender<Result<()>>,
}

impl PlaybackSession {
    /// Clear the highlight, run the end hook and deliver the outcome
    fn finish(mut self, result: Result<()>) {
        debug!(
            "Utterance {} settled (cancelled: {}, ok: {})",
            self.token,
            self.cancelled,
            result.is_ok()
        );
        self.current = None;
        (self.on_unit)(None);
        if let Some(on_end) = self.on_end.take() {
            on_end();
        }
        let _ = self.settle.send(result);
    }
}

/// Single playback channel over one speech engine
pub struct SpeechPlayback {
    /// `None` when the host has no text-to-speech at all
    engine: Option<Box<dyn SpeechEngine>>,

    /// Language tag sent with every utterance
    language: String,

    events_tx: Sender<TaggedEvent>,
    events_rx: Receiver<TaggedEvent>,

    session: Option<PlaybackSession>,

    /// Last token handed out; tokens start at 1
    last_token: u64,
}

impl SpeechPlayback {
    /// Create a playback channel over `engine`
    pub fn new(mut engine: Box<dyn SpeechEngine>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        engine.subscribe(events_tx.clone());
        Self {
            engine: Some(engine),
            language: DEFAULT_LANGUAGE.to_string(),
            events_tx,
            events_rx,
            session: None,
            last_token: 0,
        }
    }

    /// Playback for a host without text-to-speech
    ///
    /// Every speak request fails with `Unsupported`.
    pub fn unsupported() -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            engine: None,
            language: DEFAULT_LANGUAGE.to_string(),
            events_tx,
            events_rx,
            session: None,
            last_token: 0,
        }
    }

    /// Use the platform engine, or an unsupported playback if there is none
    pub fn from_platform() -> Self {
        match super::engine::create_engine() {
            Ok(engine) => Self::new(engine),
            Err(e) => {
                warn!("Speech disabled: {}", e);
                Self::unsupported()
            }
        }
    }

    /// Set the language tag for utterances
    pub fn with_language(mut self, language: &str) -> Self {
        self.set_language(language);
        self
    }

    /// Change the language tag; the current utterance keeps its own
    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether an engine is present
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Speak a sentence, highlighting symbol by symbol
    ///
    /// The text is every symbol's spoken text joined by single spaces. Any
    /// utterance still active is stopped first and settles before this one
    /// starts.
    pub fn speak<F>(
        &mut self,
        sentence: &[Symbol],
        on_unit_boundary: F,
        options: &VoiceOptions,
    ) -> Result<Completion>
    where
        F: FnMut(Option<usize>) + 'static,
    {
        let (text, boundaries) =
            BoundaryTable::for_units(sentence.iter().map(Symbol::spoken_text));
        self.start(text, boundaries, Box::new(on_unit_boundary), None, options)
    }

    /// Speak free text, highlighting word by word
    ///
    /// `on_end` runs once when the utterance ends, fails or is stopped.
    pub fn speak_text<F, E>(
        &mut self,
        text: &str,
        on_word_boundary: F,
        on_end: E,
        options: &VoiceOptions,
    ) -> Result<Completion>
    where
        F: FnMut(Option<usize>) + 'static,
        E: FnOnce() + 'static,
    {
        let boundaries = BoundaryTable::for_words(text);
        self.start(
            text.to_string(),
            boundaries,
            Box::new(on_word_boundary),
            Some(Box::new(on_end)),
            options,
        )
    }

    fn start(
        &mut self,
        text: String,
        boundaries: BoundaryTable,
        on_unit: UnitCallback,
        on_end: Option<EndCallback>,
        options: &VoiceOptions,
    ) -> Result<Completion> {
        if self.engine.is_none() {
            error!("Text-to-speech not supported on this system");
            return Err(SymspeakError::Unsupported);
        }

        // One utterance at a time
        self.stop();

        self.last_token += 1;
        let token = self.last_token;
        let (settle, rx) = mpsc::channel();

        let session = PlaybackSession {
            token,
            boundaries,
            current: None,
            cancelled: false,
            started: Instant::now(),
            on_unit,
            on_end,
            settle,
        };

        if text.trim().is_empty() {
            debug!("Nothing to say for utterance {}", token);
            session.finish(Ok(()));
            return Ok(Completion { token, rx });
        }

        let utterance = Utterance {
            token,
            text,
            voice: options.resolve(),
            language: self.language.clone(),
        };

        info!(
            "Speaking utterance {} ({} units)",
            token,
            session.boundaries.len()
        );
        let enqueued = match self.engine.as_mut() {
            Some(engine) => engine.enqueue(utterance),
            None => Err(SymspeakError::Unsupported),
        };
        if let Err(e) = enqueued {
            error!("Failed to start utterance {}: {}", token, e);
            return Err(e);
        }

        self.session = Some(session);
        Ok(Completion { token, rx })
    }

    /// Cancel the active utterance
    ///
    /// Its completion resolves and its highlight is cleared right away;
    /// events the engine still sends for it are ignored. Does nothing when
    /// idle.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        debug!("Stopping utterance {}", session.token);
        session.cancelled = true;
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.cancel() {
                error!("Failed to cancel speech: {}", e);
            }
        }
        session.finish(Ok(()));
    }

    /// Whether the engine reports active speech
    pub fn is_speaking(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.is_speaking())
    }

    /// Whether an utterance is in flight (spoken or queued)
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Index of the unit currently highlighted
    pub fn speaking_index(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.current)
    }

    /// Dispatch every queued engine event without blocking
    ///
    /// Returns how many events were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        self.check_silent_end();
        handled
    }

    /// Dispatch at most one engine event, waiting up to `timeout` for it
    ///
    /// Lets a front end redraw after every highlight change. Returns
    /// whether an event was handled.
    pub fn step(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle(event);
                true
            }
            Err(_) => {
                self.check_silent_end();
                false
            }
        }
    }

    /// Block until `completion` settles, dispatching events meanwhile
    pub fn wait(&mut self, completion: Completion) -> Result<()> {
        loop {
            if let Some(result) = completion.try_take() {
                return result;
            }
            if self.session.as_ref().map(|s| s.token) != Some(completion.token) {
                // Every session settles before it is dropped
                return completion.try_take().unwrap_or_else(|| {
                    Err(SymspeakError::Playback("utterance was abandoned".into()))
                });
            }

            match self.events_rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => self.handle(event),
                Err(RecvTimeoutError::Timeout) => self.check_silent_end(),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SymspeakError::Playback("event channel closed".into()))
                }
            }
        }
    }

    /// A sender engines or hosts can use to inject events
    pub fn event_sender(&self) -> Sender<TaggedEvent> {
        self.events_tx.clone()
    }

    fn handle(&mut self, tagged: TaggedEvent) {
        let Some(session) = self.session.as_mut() else {
            debug!("Dropping event for utterance {}: idle", tagged.token);
            return;
        };
        if session.token != tagged.token {
            debug!(
                "Dropping stale event for utterance {} (active {})",
                tagged.token, session.token
            );
            return;
        }

        match tagged.event {
            EngineEvent::Boundary { char_index } => {
                if let Some(index) = session.boundaries.unit_at(char_index) {
                    session.current = Some(index);
                    (session.on_unit)(Some(index));
                }
            }
            EngineEvent::End => {
                if let Some(session) = self.session.take() {
                    session.finish(Ok(()));
                }
            }
            EngineEvent::Error(message) => {
                error!("Speech engine error: {}", message);
                if let Some(session) = self.session.take() {
                    session.finish(Err(SymspeakError::Playback(message)));
                }
            }
        }
    }

    /// Settle the session for engines that never send `End`
    fn check_silent_end(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if engine.reports_end() || engine.is_speaking() {
            return;
        }
        let expired = self
            .session
            .as_ref()
            .is_some_and(|s| s.started.elapsed() >= START_GRACE);
        if expired {
            if let Some(session) = self.session.take() {
                debug!("Engine went silent; ending utterance {}", session.token);
                session.finish(Ok(()));
            }
        }
    }
}

impl Drop for SpeechPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::scripted::{ScriptHandle, ScriptedEngine};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn playback() -> (SpeechPlayback, ScriptHandle) {
        let (engine, handle) = ScriptedEngine::new();
        (SpeechPlayback::new(Box::new(engine)), handle)
    }

    fn symbols(texts: &[&str]) -> Vec<Symbol> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Symbol::new(&format!("s{}", i), t, "", "test"))
            .collect()
    }

    fn recorder() -> (Rc<RefCell<Vec<Option<usize>>>>, impl FnMut(Option<usize>) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |i| sink.borrow_mut().push(i))
    }

    #[test]
    fn test_utterance_text_and_voice() {
        let (mut playback, handle) = playback();
        let sentence = vec![
            Symbol::new("eu", "Eu", "👤", "people").with_speech("eu"),
            Symbol::new("water", "Água", "💧", "objects"),
        ];
        let _done = playback
            .speak(&sentence, |_| {}, &VoiceOptions::default())
            .unwrap();

        let utterance = handle.last().unwrap();
        assert_eq!(utterance.text, "eu Água");
        assert_eq!(utterance.language, "pt-BR");
        assert_eq!(utterance.voice.rate, 0.9);
        assert_eq!(utterance.voice.pitch, 1.0);
        assert_eq!(utterance.voice.volume, 1.0);
    }

    #[test]
    fn test_boundaries_map_to_symbols() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let done = playback
            .speak(&symbols(&["hello", "abc", "goodbye"]), on_unit, &VoiceOptions::default())
            .unwrap();

        handle.boundary(0);
        handle.boundary(7);
        handle.boundary(11);
        handle.finish();
        playback.wait(done).unwrap();

        assert_eq!(*log.borrow(), vec![Some(0), Some(1), Some(2), None]);
        assert!(!playback.is_active());
    }

    #[test]
    fn test_boundary_outside_text_is_ignored() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let _done = playback
            .speak(&symbols(&["ab"]), on_unit, &VoiceOptions::default())
            .unwrap();

        handle.boundary(40);
        playback.pump();
        assert!(log.borrow().is_empty());
        assert_eq!(playback.speaking_index(), None);
    }

    #[test]
    fn test_engine_error_rejects_and_clears() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let done = playback
            .speak(&symbols(&["a", "b"]), on_unit, &VoiceOptions::default())
            .unwrap();

        handle.boundary(2);
        handle.fail("audio-busy");
        let result = playback.wait(done);

        assert!(matches!(result, Err(SymspeakError::Playback(ref m)) if m == "audio-busy"));
        assert_eq!(*log.borrow(), vec![Some(1), None]);
    }

    #[test]
    fn test_second_speak_settles_first() {
        let (mut playback, handle) = playback();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first_log = Rc::clone(&order);
        let first = playback
            .speak(
                &symbols(&["one"]),
                move |i| first_log.borrow_mut().push(("first", i)),
                &VoiceOptions::default(),
            )
            .unwrap();

        let second_log = Rc::clone(&order);
        let second = playback
            .speak(
                &symbols(&["two", "three"]),
                move |i| second_log.borrow_mut().push(("second", i)),
                &VoiceOptions::default(),
            )
            .unwrap();

        // The first request has already settled
        assert!(matches!(first.try_take(), Some(Ok(()))));
        assert_eq!(handle.cancel_count(), 1);

        handle.boundary(4);
        handle.finish();
        playback.wait(second).unwrap();

        assert_eq!(
            *order.borrow(),
            vec![("first", None), ("second", Some(1)), ("second", None)]
        );
    }

    #[test]
    fn test_stale_events_are_dropped() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let first = playback
            .speak(&symbols(&["one"]), |_| {}, &VoiceOptions::default())
            .unwrap();
        let _second = playback
            .speak(&symbols(&["two"]), on_unit, &VoiceOptions::default())
            .unwrap();

        handle.send(first.token(), EngineEvent::Boundary { char_index: 0 });
        handle.send(first.token(), EngineEvent::End);
        playback.pump();

        assert!(log.borrow().is_empty());
        assert!(playback.is_active());
    }

    #[test]
    fn test_stop_resolves_and_clears() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let done = playback
            .speak(&symbols(&["a", "b"]), on_unit, &VoiceOptions::default())
            .unwrap();
        handle.boundary(0);
        playback.pump();

        playback.stop();
        assert!(matches!(done.try_take(), Some(Ok(()))));
        assert_eq!(*log.borrow(), vec![Some(0), None]);
        assert!(!playback.is_speaking());
    }

    #[test]
    fn test_stop_when_idle() {
        let (mut playback, handle) = playback();
        playback.stop();
        assert_eq!(handle.cancel_count(), 0);

        let (log, on_unit) = recorder();
        let done = playback
            .speak(&symbols(&["a"]), on_unit, &VoiceOptions::default())
            .unwrap();
        handle.finish();
        playback.wait(done).unwrap();

        playback.stop();
        assert_eq!(*log.borrow(), vec![None]);
        assert_eq!(handle.cancel_count(), 0);
    }

    #[test]
    fn test_unsupported_rejects_immediately() {
        let mut playback = SpeechPlayback::unsupported();
        let (log, on_unit) = recorder();

        let result = playback.speak(&symbols(&["a"]), on_unit, &VoiceOptions::default());
        assert!(matches!(result, Err(SymspeakError::Unsupported)));

        let result = playback.speak_text("oi", |_| {}, || {}, &VoiceOptions::default());
        assert!(matches!(result, Err(SymspeakError::Unsupported)));

        assert!(log.borrow().is_empty());
        assert!(!playback.is_speaking());
        playback.stop();
    }

    #[test]
    fn test_speak_text_words_and_end() {
        let (mut playback, handle) = playback();
        let (log, on_word) = recorder();
        let ended = Rc::new(RefCell::new(0));
        let ended_sink = Rc::clone(&ended);

        let done = playback
            .speak_text(
                "eu  quero água",
                on_word,
                move || *ended_sink.borrow_mut() += 1,
                &VoiceOptions::default(),
            )
            .unwrap();
        assert_eq!(handle.last().unwrap().text, "eu  quero água");

        handle.boundary(0);
        handle.boundary(3); // whitespace
        handle.boundary(4);
        handle.boundary(10);
        handle.finish();
        playback.wait(done).unwrap();

        assert_eq!(*log.borrow(), vec![Some(0), Some(1), Some(2), None]);
        assert_eq!(*ended.borrow(), 1);
    }

    #[test]
    fn test_speak_text_end_runs_on_stop_and_error() {
        let (mut playback, handle) = playback();
        let ended = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&ended);
        let _done = playback
            .speak_text("a b", |_| {}, move || *sink.borrow_mut() += 1, &VoiceOptions::default())
            .unwrap();
        playback.stop();
        assert_eq!(*ended.borrow(), 1);

        let sink = Rc::clone(&ended);
        let done = playback
            .speak_text("c d", |_| {}, move || *sink.borrow_mut() += 1, &VoiceOptions::default())
            .unwrap();
        handle.fail("interrupted");
        assert!(playback.wait(done).is_err());
        assert_eq!(*ended.borrow(), 2);
    }

    #[test]
    fn test_blank_text_settles_without_engine() {
        let (mut playback, handle) = playback();
        let done = playback
            .speak_text("   ", |_| {}, || {}, &VoiceOptions::default())
            .unwrap();
        assert!(matches!(done.try_take(), Some(Ok(()))));
        assert!(handle.utterances().is_empty());
        assert!(!playback.is_active());
    }

    #[test]
    fn test_language_and_options() {
        let (engine, handle) = ScriptedEngine::new();
        let mut playback = SpeechPlayback::new(Box::new(engine)).with_language("en-US");
        let options = VoiceOptions {
            rate: Some(1.3),
            ..Default::default()
        };
        let _done = playback.speak(&symbols(&["hi"]), |_| {}, &options).unwrap();

        let utterance = handle.last().unwrap();
        assert_eq!(utterance.language, "en-US");
        assert_eq!(utterance.voice.rate, 1.3);
    }

    #[test]
    fn test_narrating_engine() {
        let engine = ScriptedEngine::narrating(Duration::ZERO);
        let mut playback = SpeechPlayback::new(Box::new(engine));
        let (log, on_unit) = recorder();

        let done = playback
            .speak(&symbols(&["bom", "dia"]), on_unit, &VoiceOptions::default())
            .unwrap();
        playback.wait(done).unwrap();

        assert_eq!(*log.borrow(), vec![Some(0), Some(1), None]);
    }

    #[test]
    fn test_step_dispatches_one_event_at_a_time() {
        let (mut playback, handle) = playback();
        let (log, on_unit) = recorder();
        let _done = playback
            .speak(&symbols(&["bom", "dia"]), on_unit, &VoiceOptions::default())
            .unwrap();

        handle.boundary(0);
        handle.boundary(4);
        assert!(playback.step(Duration::from_secs(1)));
        assert_eq!(playback.speaking_index(), Some(0));
        assert!(playback.step(Duration::from_secs(1)));
        assert_eq!(playback.speaking_index(), Some(1));
        assert!(!playback.step(Duration::from_millis(10)));
        assert_eq!(*log.borrow(), vec![Some(0), Some(1)]);
    }
}
