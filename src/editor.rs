//! Sentence editing and free-text composition
//!
//! These controllers sit between a front end and the core: edits go into
//! [`SentenceHistory`], speak requests go to a [`SpeechPlayback`], and the
//! highlight index is kept where the front end can read it after every
//! pumped event.

use crate::history::SentenceHistory;
use crate::speech::{BoundaryTable, Completion, SpeechPlayback, VoiceOptions};
use crate::symbol::{self, Sentence, Symbol};
use crate::Result;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;

/// Outcome of pressing the speak/stop button
#[must_use]
pub enum SpeakToggle {
    /// Speech started; the completion settles when it ends
    Started(Completion),
    /// Speech that was running has been stopped
    Stopped,
    /// Nothing to say
    Idle,
}

/// Highlight shared with the playback callback
///
/// The callback receives `None` exactly once, when the utterance settles,
/// so that also marks the end of speaking.
#[derive(Clone, Default)]
struct Highlight {
    index: Rc<Cell<Option<usize>>>,
    speaking: Rc<Cell<bool>>,
}

impl Highlight {
    fn start(&self) {
        self.index.set(None);
        self.speaking.set(true);
    }

    fn reset(&self) {
        self.index.set(None);
        self.speaking.set(false);
    }

    fn callback(&self) -> impl FnMut(Option<usize>) + 'static {
        let index = Rc::clone(&self.index);
        let speaking = Rc::clone(&self.speaking);
        move |i| {
            index.set(i);
            if i.is_none() {
                speaking.set(false);
            }
        }
    }
}

/// Builds a sentence from symbols, with undo/redo and read-aloud
pub struct SentenceEditor {
    history: SentenceHistory,
    recent_symbols: Vec<Symbol>,
    recent_limit: usize,
    highlight: Highlight,
}

impl SentenceEditor {
    pub fn new(recent_limit: usize) -> Self {
        Self::with_history(SentenceHistory::new(), recent_limit)
    }

    /// Continue from an existing history (e.g. restored from storage)
    pub fn with_history(history: SentenceHistory, recent_limit: usize) -> Self {
        Self {
            history,
            recent_symbols: Vec::new(),
            recent_limit,
            highlight: Highlight::default(),
        }
    }

    /// The sentence on the strip
    pub fn sentence(&self) -> &Sentence {
        self.history.current()
    }

    pub fn history(&self) -> &SentenceHistory {
        &self.history
    }

    /// Append a symbol and remember it as recently used
    pub fn select_symbol(&mut self, symbol: Symbol) {
        self.recent_symbols.retain(|s| s.id != symbol.id);
        self.recent_symbols.insert(0, symbol.clone());
        self.recent_symbols.truncate(self.recent_limit);

        let next = symbol::appended(self.sentence(), symbol);
        self.history.add(next);
    }

    /// Remove the symbol at `index`
    pub fn remove_symbol(&mut self, index: usize) {
        let next = symbol::removed(self.sentence(), index);
        self.history.add(next);
    }

    /// Move a symbol within the sentence
    pub fn reorder_symbol(&mut self, from: usize, to: usize) {
        let next = symbol::moved(self.sentence(), from, to);
        self.history.add(next);
    }

    /// Empty the strip (undoable)
    pub fn clear(&mut self) {
        self.history.add(Vec::new());
    }

    /// Replace the strip with a saved or recent phrase
    pub fn select_phrase(&mut self, phrase: &Sentence) {
        self.history.add(phrase.clone());
    }

    pub fn undo(&mut self) {
        self.history.undo();
    }

    pub fn redo(&mut self) {
        self.history.redo();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_save(&self) -> bool {
        !self.sentence().is_empty()
    }

    /// Symbols picked most recently, newest first
    pub fn recent_symbols(&self) -> &[Symbol] {
        &self.recent_symbols
    }

    /// Stop if speaking, otherwise read the sentence aloud
    pub fn toggle_speak(
        &mut self,
        playback: &mut SpeechPlayback,
        options: &VoiceOptions,
    ) -> Result<SpeakToggle> {
        if self.is_speaking() {
            playback.stop();
            self.highlight.reset();
            return Ok(SpeakToggle::Stopped);
        }
        if self.sentence().is_empty() {
            return Ok(SpeakToggle::Idle);
        }

        self.highlight.start();
        match playback.speak(self.sentence(), self.highlight.callback(), options) {
            Ok(completion) => Ok(SpeakToggle::Started(completion)),
            Err(e) => {
                self.highlight.reset();
                Err(e)
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.highlight.speaking.get()
    }

    /// Index of the symbol being spoken
    pub fn speaking_index(&self) -> Option<usize> {
        self.highlight.index.get()
    }
}

/// A piece of free text: either a word (with its index) or whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub word: Option<usize>,
}

/// Free text typed by the user and read word by word
pub struct FreeTextComposer {
    text: String,
    highlight: Highlight,
}

impl FreeTextComposer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            highlight: Highlight::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text; ignored while it is being spoken
    pub fn set_text(&mut self, text: &str) {
        if self.is_speaking() {
            debug!("Text is read-only while speaking");
            return;
        }
        self.text = text.to_string();
    }

    /// Clear the text, stopping speech if needed
    pub fn clear(&mut self, playback: &mut SpeechPlayback) {
        if self.is_speaking() {
            playback.stop();
        }
        self.highlight.reset();
        self.text.clear();
    }

    /// Stop if speaking, otherwise read the text aloud
    pub fn toggle_speak(
        &mut self,
        playback: &mut SpeechPlayback,
        options: &VoiceOptions,
    ) -> Result<SpeakToggle> {
        if self.is_speaking() {
            playback.stop();
            self.highlight.reset();
            return Ok(SpeakToggle::Stopped);
        }
        if self.text.trim().is_empty() {
            return Ok(SpeakToggle::Idle);
        }

        self.highlight.start();
        let speaking = Rc::clone(&self.highlight.speaking);
        let result = playback.speak_text(
            &self.text,
            self.highlight.callback(),
            move || speaking.set(false),
            options,
        );
        match result {
            Ok(completion) => Ok(SpeakToggle::Started(completion)),
            Err(e) => {
                self.highlight.reset();
                Err(e)
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.highlight.speaking.get()
    }

    /// Index of the word being spoken
    pub fn speaking_word(&self) -> Option<usize> {
        self.highlight.index.get()
    }

    /// Split the text into words and the whitespace between them
    pub fn segments(&self) -> Vec<Segment> {
        let table = BoundaryTable::for_words(&self.text);
        let chars: Vec<char> = self.text.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0;

        for (word, range) in table.ranges().iter().enumerate() {
            if range.start > pos {
                segments.push(Segment {
                    text: chars[pos..range.start].iter().collect(),
                    word: None,
                });
            }
            segments.push(Segment {
                text: chars[range.clone()].iter().collect(),
                word: Some(word),
            });
            pos = range.end;
        }
        if pos < chars.len() {
            segments.push(Segment {
                text: chars[pos..].iter().collect(),
                word: None,
            });
        }
        segments
    }
}

impl Default for FreeTextComposer {
    fn default() -> Self {
        Self::new()
    }
}
