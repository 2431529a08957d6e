//! Symbols and sentences
//!
//! A symbol is one pictographic communication unit. A sentence is the
//! ordered list of symbols the user is composing; it is treated as a value,
//! so every edit below returns a new sentence instead of mutating in place.

use serde::{Deserialize, Serialize};

/// Category id used for symbols the user created
pub const CUSTOM_CATEGORY: &str = "custom";

/// A single pictographic communication unit
///
/// Field names follow the stored JSON layout (`speechText`, `imageUrl`,
/// `isCustom`) so existing symbol lists load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// Unique id; edited custom symbols keep their id
    pub id: String,

    /// Display name
    pub name: String,

    /// Emoji glyph (empty for image-based custom symbols)
    #[serde(default)]
    pub emoji: String,

    /// Category id this symbol belongs to
    #[serde(default)]
    pub category: String,

    /// Text to speak instead of the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_text: Option<String>,

    /// Image reference (data URL or path) for custom symbols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub is_custom: bool,
}

impl Symbol {
    /// Create a built-in symbol with an emoji glyph
    pub fn new(id: &str, name: &str, emoji: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            category: category.to_string(),
            speech_text: None,
            image_url: None,
            is_custom: false,
        }
    }

    /// Set the spoken text
    pub fn with_speech(mut self, text: &str) -> Self {
        self.speech_text = Some(text.to_string());
        self
    }

    /// Create a custom symbol backed by an image
    pub fn custom(id: &str, name: &str, image_url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            emoji: String::new(),
            category: CUSTOM_CATEGORY.to_string(),
            speech_text: Some(name.to_string()),
            image_url: Some(image_url.to_string()),
            is_custom: true,
        }
    }

    /// Text read aloud for this symbol (spoken text, else the name)
    ///
    /// An empty spoken text counts as absent.
    pub fn spoken_text(&self) -> &str {
        match self.speech_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.name,
        }
    }

    /// Glyph to show in a text front end
    pub fn glyph(&self) -> &str {
        if self.emoji.is_empty() {
            "▣"
        } else {
            &self.emoji
        }
    }
}

/// An ordered sequence of symbols; order is reading order
pub type Sentence = Vec<Symbol>;

/// Id sequence of a sentence, used for duplicate detection
pub fn id_sequence(sentence: &[Symbol]) -> Vec<&str> {
    sentence.iter().map(|s| s.id.as_str()).collect()
}

/// True when both sentences hold the same symbol ids in the same order
pub fn same_ids(a: &[Symbol], b: &[Symbol]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

/// Names joined by spaces, for display
pub fn display_text(sentence: &[Symbol]) -> String {
    sentence
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// New sentence with `symbol` appended
pub fn appended(sentence: &[Symbol], symbol: Symbol) -> Sentence {
    let mut next = sentence.to_vec();
    next.push(symbol);
    next
}

/// New sentence without the symbol at `index`
///
/// An out-of-range index returns an unchanged copy.
pub fn removed(sentence: &[Symbol], index: usize) -> Sentence {
    sentence
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, s)| s.clone())
        .collect()
}

/// New sentence with the symbol at `from` moved to `to`
///
/// `to` is clamped to the end; an out-of-range `from` returns a copy.
pub fn moved(sentence: &[Symbol], from: usize, to: usize) -> Sentence {
    let mut next = sentence.to_vec();
    if from >= next.len() {
        return next;
    }
    let symbol = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, symbol);
    next
}
