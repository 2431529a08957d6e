//! Undo/redo history for the sentence being composed
//!
//! The history is a reducer over immutable sentence snapshots: every
//! transition takes a state and returns the next one. `past` is never
//! empty, so the current sentence is always its last element.

use crate::symbol::{same_ids, Sentence};
use log::debug;

/// Actions accepted by the history reducer
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// Record a new sentence as current
    Add(Sentence),
    /// Step back one snapshot
    Undo,
    /// Step forward one snapshot
    Redo,
}

/// Two-stack undo/redo state
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    /// Snapshots oldest first; the last one is current
    past: Vec<Sentence>,
    /// Snapshots available for redo, nearest first
    future: Vec<Sentence>,
}

impl HistoryState {
    /// Initial state: a single empty sentence, nothing to redo
    pub fn new() -> Self {
        Self {
            past: vec![Vec::new()],
            future: Vec::new(),
        }
    }

    /// The sentence currently shown
    pub fn current(&self) -> &Sentence {
        // `past` is never empty
        &self.past[self.past.len() - 1]
    }

    pub fn past(&self) -> &[Sentence] {
        &self.past
    }

    pub fn future(&self) -> &[Sentence] {
        &self.future
    }
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one action and return the next state
///
/// No transition can fail; actions that do not apply return the state
/// unchanged.
pub fn reduce(state: HistoryState, action: HistoryAction) -> HistoryState {
    let HistoryState { mut past, mut future } = state;

    match action {
        HistoryAction::Add(sentence) => {
            if past.last().is_some_and(|top| same_ids(top, &sentence)) {
                debug!("History add ignored: same symbol ids as current");
                return HistoryState { past, future };
            }
            past.push(sentence);
            future.clear();
        }
        HistoryAction::Undo => {
            if past.len() > 1 {
                if let Some(top) = past.pop() {
                    future.insert(0, top);
                }
            }
        }
        HistoryAction::Redo => {
            if !future.is_empty() {
                past.push(future.remove(0));
            }
        }
    }

    HistoryState { past, future }
}

/// Owner of a [`HistoryState`] with method-style transitions
#[derive(Debug, Clone, Default)]
pub struct SentenceHistory {
    state: HistoryState,
}

impl SentenceHistory {
    /// Start from the single empty sentence
    pub fn new() -> Self {
        Self {
            state: HistoryState::new(),
        }
    }

    /// Start from a sentence restored from storage
    ///
    /// A non-empty sentence is stacked on top of the empty one so the
    /// user can still undo back to a blank strip.
    pub fn with_initial(sentence: Sentence) -> Self {
        let mut history = Self::new();
        history.add(sentence);
        history
    }

    /// Dispatch a reducer action
    pub fn dispatch(&mut self, action: HistoryAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        debug!(
            "History now past={} future={}",
            self.state.past.len(),
            self.state.future.len()
        );
    }

    /// Record a new current sentence and drop the redo branch
    pub fn add(&mut self, sentence: Sentence) {
        self.dispatch(HistoryAction::Add(sentence));
    }

    /// Record an untyped payload, e.g. one read back from storage
    ///
    /// Anything that is not an array of symbols is ignored.
    pub fn add_json(&mut self, payload: &serde_json::Value) {
        if !payload.is_array() {
            debug!("History add ignored: payload is not an array");
            return;
        }
        match serde_json::from_value::<Sentence>(payload.clone()) {
            Ok(sentence) => self.add(sentence),
            Err(e) => debug!("History add ignored: {}", e),
        }
    }

    pub fn undo(&mut self) {
        self.dispatch(HistoryAction::Undo);
    }

    pub fn redo(&mut self) {
        self.dispatch(HistoryAction::Redo);
    }

    /// The sentence currently shown; always defined
    pub fn current(&self) -> &Sentence {
        self.state.current()
    }

    pub fn can_undo(&self) -> bool {
        self.state.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.state.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.state.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.state.future.len()
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }
}
