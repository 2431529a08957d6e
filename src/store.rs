//! JSON persistence for symbols and phrases
//!
//! Each key is stored as `<key>.json` in the data directory. Reads never
//! fail: a missing or unreadable file yields the default value, so a
//! damaged file costs its contents but never blocks startup.

use crate::goals::{Goal, Session};
use crate::symbol::{Sentence, Symbol};
use crate::{Result, SymspeakError};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CUSTOM_SYMBOLS: &str = "customSymbols";
pub const SAVED_PHRASES: &str = "savedPhrases";
pub const RECENT_PHRASES: &str = "recentPhrases";
pub const SENTENCE: &str = "sentence";
pub const THERAPIST_GOALS: &str = "therapistGoals";
pub const THERAPIST_SESSIONS: &str = "therapistSessions";

/// Key-value store backed by one JSON file per key
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            SymspeakError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        debug!("Store opened at {:?}", dir);
        Ok(Self { dir })
    }

    /// Default data directory (`<data dir>/symspeak`)
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a value, falling back to `T::default()`
    pub fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                return T::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring malformed {:?}: {}", path, e);
                T::default()
            }
        }
    }

    /// Write a value, replacing the file atomically
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!("Saved {:?}", path);
        Ok(())
    }

    pub fn custom_symbols(&self) -> Vec<Symbol> {
        self.load(CUSTOM_SYMBOLS)
    }

    pub fn saved_phrases(&self) -> Vec<Sentence> {
        self.load(SAVED_PHRASES)
    }

    pub fn recent_phrases(&self) -> Vec<Sentence> {
        self.load(RECENT_PHRASES)
    }

    pub fn therapist_goals(&self) -> Vec<Goal> {
        self.load(THERAPIST_GOALS)
    }

    pub fn therapist_sessions(&self) -> Vec<Session> {
        self.load(THERAPIST_SESSIONS)
    }

    /// Last sentence on the strip, as an untyped payload
    ///
    /// Left untyped so the history can decide what to do with bad data.
    pub fn sentence(&self) -> serde_json::Value {
        self.load(SENTENCE)
    }
}
