//! Saved and recently spoken phrases

use crate::symbol::{same_ids, Sentence};
use log::debug;

/// Phrases the user chose to keep, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedPhrases {
    phrases: Vec<Sentence>,
}

impl SavedPhrases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_phrases(phrases: Vec<Sentence>) -> Self {
        Self { phrases }
    }

    /// Save a phrase at the front
    ///
    /// Empty sentences and phrases already saved are skipped; two phrases
    /// are the same when their symbols match by id and name. Returns
    /// whether the phrase was added.
    pub fn save(&mut self, sentence: &Sentence) -> bool {
        if sentence.is_empty() {
            return false;
        }
        let duplicate = self.phrases.iter().any(|p| {
            p.len() == sentence.len()
                && p
                    .iter()
                    .zip(sentence)
                    .all(|(a, b)| a.id == b.id && a.name == b.name)
        });
        if duplicate {
            debug!("Phrase already saved");
            return false;
        }
        self.phrases.insert(0, sentence.clone());
        true
    }

    /// Remove the phrase at `index`
    pub fn delete(&mut self, index: usize) -> Option<Sentence> {
        if index < self.phrases.len() {
            Some(self.phrases.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.phrases.get(index)
    }

    pub fn phrases(&self) -> &[Sentence] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Bounded history of spoken sentences, most recent first
#[derive(Debug, Clone, PartialEq)]
pub struct RecentPhrases {
    phrases: Vec<Sentence>,
    limit: usize,
}

impl RecentPhrases {
    pub fn new(limit: usize) -> Self {
        Self {
            phrases: Vec::new(),
            limit,
        }
    }

    /// Restore from storage, dropping anything past the limit
    pub fn from_phrases(mut phrases: Vec<Sentence>, limit: usize) -> Self {
        phrases.truncate(limit);
        Self { phrases, limit }
    }

    /// Record a spoken sentence, moving an earlier copy to the front
    pub fn record(&mut self, sentence: &Sentence) {
        if sentence.is_empty() {
            return;
        }
        self.phrases.retain(|p| !same_ids(p, sentence));
        self.phrases.insert(0, sentence.clone());
        self.phrases.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.phrases.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.phrases.get(index)
    }

    pub fn phrases(&self) -> &[Sentence] {
        &self.phrases
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
