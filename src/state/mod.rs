//! Application state management
//!
//! The State struct is the central data structure of the communicator,
//! holding configuration, storage, the user's symbols and phrases, the
//! editors and the speech playback.

pub mod config;

use crate::analytics::UsageStats;
use crate::catalog;
use crate::editor::{FreeTextComposer, SentenceEditor, SpeakToggle};
use crate::goals::{Goals, Sessions};
use crate::history::SentenceHistory;
use crate::library::SymbolLibrary;
use crate::phrases::{RecentPhrases, SavedPhrases};
use crate::speech::backends::scripted::ScriptedEngine;
use crate::speech::{SpeechPlayback, VoiceOptions};
use crate::store::{self, JsonStore};
use crate::symbol::{Sentence, Symbol};
use crate::Result;
use config::Config;
use log::{debug, info, warn};
use std::time::Duration;

/// Time given to each word when speech is narrated instead of played
pub const NARRATION_WORD_TIME: Duration = Duration::from_millis(350);

/// How long to wait for a speech event before checking again
const FOLLOW_POLL: Duration = Duration::from_millis(50);

/// Main application state
pub struct State {
    /// Configuration loaded from ~/.symspeak.cfg
    pub config: Config,

    /// Where symbols and phrases live between runs
    pub store: JsonStore,

    /// Symbols the user created
    pub library: SymbolLibrary,

    /// Phrases the user saved
    pub saved: SavedPhrases,

    /// Sentences spoken lately
    pub recent: RecentPhrases,

    /// The sentence strip
    pub editor: SentenceEditor,

    /// Free text mode
    pub composer: FreeTextComposer,

    /// Speech output
    pub playback: SpeechPlayback,

    /// Voice settings for every utterance
    pub voice: VoiceOptions,

    /// Therapy goals, newest first
    pub goals: Goals,

    /// Therapy session notes, newest first
    pub sessions: Sessions,
}

impl State {
    /// Load configuration and stored data, speaking through the platform
    ///
    /// With `silent`, speech is narrated by an in-memory engine instead.
    pub fn new(silent: bool) -> Result<Self> {
        let config = Config::load()?;
        info!("Configuration loaded from {:?}", config.path());

        let playback = if silent {
            info!("Silent mode, speech is not played");
            let engine = ScriptedEngine::narrating(NARRATION_WORD_TIME);
            SpeechPlayback::new(Box::new(engine))
        } else {
            SpeechPlayback::from_platform()
        };
        Self::with_playback(config, playback)
    }

    /// Build the state around an existing config and playback
    pub fn with_playback(config: Config, playback: SpeechPlayback) -> Result<Self> {
        let store = JsonStore::open(config.data_dir())?;
        info!("Data directory: {:?}", store.dir());

        let library = SymbolLibrary::from_symbols(store.custom_symbols());
        let saved = SavedPhrases::from_phrases(store.saved_phrases());
        let recent = RecentPhrases::from_phrases(store.recent_phrases(), config.recent_phrases_limit());
        let goals = Goals::from_goals(store.therapist_goals());
        let sessions = Sessions::from_sessions(store.therapist_sessions());
        info!(
            "  {} custom symbols, {} saved phrases, {} recent",
            library.len(),
            saved.len(),
            recent.phrases().len()
        );
        info!("  {} goals, {} sessions", goals.goals().len(), sessions.len());

        let mut history = SentenceHistory::new();
        history.add_json(&store.sentence());
        let editor = SentenceEditor::with_history(history, config.recent_symbols_limit());

        let playback = playback.with_language(&config.language());
        if !playback.is_supported() {
            warn!("No text-to-speech available; speaking will fail");
        }

        Ok(Self {
            voice: config.voice_options(),
            config,
            store,
            library,
            saved,
            recent,
            editor,
            composer: FreeTextComposer::new(),
            playback,
            goals,
            sessions,
        })
    }

    /// Symbols shown for a category id
    pub fn symbols_in(&self, category: &str) -> Vec<Symbol> {
        if catalog::is_custom_category(category) {
            self.library.symbols().to_vec()
        } else {
            catalog::category(category)
                .map(|c| c.to_symbols())
                .unwrap_or_default()
        }
    }

    /// Find a symbol by id among custom and built-in symbols
    pub fn resolve(&self, id: &str) -> Option<Symbol> {
        catalog::resolve(id, self.library.symbols())
    }

    /// Speak or stop the sentence; a started sentence is remembered as recent
    pub fn toggle_sentence(&mut self) -> Result<SpeakToggle> {
        let toggle = self.editor.toggle_speak(&mut self.playback, &self.voice)?;
        if let SpeakToggle::Started(_) = toggle {
            self.recent.record(self.editor.sentence());
        }
        Ok(toggle)
    }

    /// Speak or stop free text
    pub fn toggle_text(&mut self) -> Result<SpeakToggle> {
        self.composer.toggle_speak(&mut self.playback, &self.voice)
    }

    /// Save the current sentence; false if empty or already saved
    pub fn save_phrase(&mut self) -> bool {
        self.saved.save(self.editor.sentence())
    }

    /// Load a saved phrase onto the strip
    pub fn use_saved(&mut self, index: usize) -> Option<&Sentence> {
        let phrase = self.saved.get(index)?.clone();
        self.editor.select_phrase(&phrase);
        Some(self.editor.sentence())
    }

    /// Load a recent phrase onto the strip
    pub fn use_recent(&mut self, index: usize) -> Option<&Sentence> {
        let phrase = self.recent.get(index)?.clone();
        self.editor.select_phrase(&phrase);
        Some(self.editor.sentence())
    }

    /// Statistics over the saved phrases
    pub fn stats(&self) -> UsageStats {
        UsageStats::compute(self.saved.phrases(), self.library.symbols())
    }

    /// Dispatch pending speech events
    pub fn pump(&mut self) -> usize {
        self.playback.pump()
    }

    /// Apply a `[speech]` setting, write the config file and use it from now on
    pub fn set_speech_option(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set("speech", key, value);
        self.config.save()?;
        self.voice = self.config.voice_options();
        if key == "language" {
            self.playback.set_language(&self.config.language());
        }
        debug!("speech.{} = {}", key, value);
        Ok(())
    }

    /// Dispatch speech events one at a time until nothing is being spoken
    ///
    /// `on_highlight` runs each time the highlighted symbol or word moves
    /// to a new position.
    pub fn follow_speech<F: FnMut(&State)>(&mut self, mut on_highlight: F) {
        let mut shown = None;
        while self.editor.is_speaking() || self.composer.is_speaking() {
            self.playback.step(FOLLOW_POLL);
            let current = self
                .editor
                .speaking_index()
                .or_else(|| self.composer.speaking_word());
            if current.is_some() && current != shown {
                on_highlight(&*self);
            }
            shown = current;
        }
    }

    /// Write symbols, phrases and the current sentence to the store
    pub fn persist(&self) -> Result<()> {
        self.store.save(store::CUSTOM_SYMBOLS, self.library.symbols())?;
        self.store.save(store::SAVED_PHRASES, self.saved.phrases())?;
        self.store.save(store::RECENT_PHRASES, self.recent.phrases())?;
        self.store.save(store::SENTENCE, self.editor.sentence())?;
        self.store.save(store::THERAPIST_GOALS, self.goals.goals())?;
        self.store.save(store::THERAPIST_SESSIONS, self.sessions.sessions())?;
        info!("State saved to {:?}", self.store.dir());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::id_sequence;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let cfg = dir.path().join("symspeak.cfg");
        std::fs::write(
            &cfg,
            format!(
                "[speech]\nlanguage=pt-BR\n[storage]\ndata_dir={}\n",
                dir.path().join("data").display()
            ),
        )
        .unwrap();
        Config::load_from(&cfg).unwrap()
    }

    fn state_in(dir: &TempDir) -> (State, crate::speech::backends::scripted::ScriptHandle) {
        let (engine, handle) = ScriptedEngine::new();
        let playback = SpeechPlayback::new(Box::new(engine));
        (State::with_playback(config_in(dir), playback).unwrap(), handle)
    }

    fn pick(state: &mut State, id: &str) {
        let symbol = state.resolve(id).unwrap();
        state.editor.select_symbol(symbol);
    }

    #[test]
    fn test_fresh_state() {
        let dir = TempDir::new().unwrap();
        let (state, _) = state_in(&dir);
        assert!(state.editor.sentence().is_empty());
        assert!(state.library.is_empty());
        assert_eq!(state.playback.language(), "pt-BR");
        assert_eq!(state.symbols_in("food").len(), 6);
        assert!(state.symbols_in("nowhere").is_empty());
    }

    #[test]
    fn test_speaking_records_recent() {
        let dir = TempDir::new().unwrap();
        let (mut state, handle) = state_in(&dir);
        pick(&mut state, "me");
        pick(&mut state, "happy");

        let toggle = state.toggle_sentence().unwrap();
        assert!(matches!(toggle, SpeakToggle::Started(_)));
        assert_eq!(handle.last().unwrap().language, "pt-BR");
        assert_eq!(id_sequence(state.recent.get(0).unwrap()), vec!["me", "happy"]);
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        {
            let (mut state, _) = state_in(&dir);
            let custom = state.library.add("Vovó", "data:image/png;base64,AAAA");
            state.editor.select_symbol(custom);
            pick(&mut state, "love");
            let goal = state.goals.add("Pedir ajuda").unwrap();
            state.goals.add("Nomear emoções");
            state.goals.toggle(&goal.id);
            state.sessions.add(Some(45), "Treino com pranchas");
            assert!(state.save_phrase());
            assert!(!state.save_phrase());
            state.persist().unwrap();
        }

        let (mut state, _) = state_in(&dir);
        assert_eq!(state.library.len(), 1);
        assert_eq!(state.saved.len(), 1);
        assert_eq!(state.editor.sentence().len(), 2);
        assert!(state.editor.can_undo());
        assert_eq!(state.goals.goals()[0].text, "Nomear emoções");
        assert_eq!(state.goals.completed().count(), 1);
        assert!(state.goals.goals()[1].date_completed.is_some());
        assert_eq!(state.sessions.sessions()[0].duration, 45);

        state.editor.clear();
        let phrase = state.use_saved(0).unwrap();
        assert_eq!(phrase.len(), 2);
        assert!(state.use_saved(3).is_none());

        let stats = state.stats();
        assert_eq!(stats.total_phrases, 1);
        assert_eq!(stats.category_usage.get("Personalizados"), Some(1));
    }

    #[test]
    fn test_speech_option_is_saved() {
        let dir = TempDir::new().unwrap();
        let (mut state, handle) = state_in(&dir);
        state.set_speech_option("rate", "1.4").unwrap();
        state.set_speech_option("language", "en-US").unwrap();
        assert_eq!(state.voice.rate, Some(1.4));

        pick(&mut state, "me");
        state.toggle_sentence().unwrap();
        let spoken = handle.last().unwrap();
        assert_eq!(spoken.language, "en-US");
        assert_eq!(spoken.voice.rate, 1.4);

        let reloaded = Config::load_from(state.config.path()).unwrap();
        assert_eq!(reloaded.language(), "en-US");
    }

    #[test]
    fn test_follow_speech_reports_each_symbol() {
        let dir = TempDir::new().unwrap();
        let engine = ScriptedEngine::narrating(Duration::ZERO);
        let playback = SpeechPlayback::new(Box::new(engine));
        let mut state = State::with_playback(config_in(&dir), playback).unwrap();
        pick(&mut state, "me");
        pick(&mut state, "eat");
        pick(&mut state, "apple");

        assert!(matches!(state.toggle_sentence().unwrap(), SpeakToggle::Started(_)));
        let mut seen = Vec::new();
        state.follow_speech(|s| seen.push(s.editor.speaking_index()));

        assert_eq!(seen, vec![Some(0), Some(1), Some(2)]);
        assert!(!state.editor.is_speaking());
        assert_eq!(state.editor.speaking_index(), None);
    }
}
