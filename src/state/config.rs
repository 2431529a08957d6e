//! Configuration management

use crate::speech::voice::{VoiceOptions, DEFAULT_LANGUAGE};
use crate::store::JsonStore;
use crate::{Result, SymspeakError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "SYMSPEAK_CONFIG";

/// Application configuration
///
/// Holds the voice defaults every utterance starts from, the language tag
/// sent to the engine, where symbols and phrases are stored, and list
/// sizes for the recent histories.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.symspeak.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing defaults there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(path)
                .map_err(|e| SymspeakError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(path)
                .map_err(|e| SymspeakError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self {
            ini,
            path: path.to_path_buf(),
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| SymspeakError::Config(format!("Failed to save config: {}", e)))
    }

    /// Config file path: `$SYMSPEAK_CONFIG`, else ~/.symspeak.cfg
    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".symspeak.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("language", DEFAULT_LANGUAGE)
            .set("pitch", "1.0")
            .set("rate", "0.9")
            .set("volume", "1.0");

        ini.with_section(Some("history"))
            .set("recent_phrases", "20")
            .set("recent_symbols", "6");

        ini.with_section(Some("storage"));

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value, if present and valid
    pub fn get_float(&self, section: &str, key: &str) -> Option<f32> {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Language tag for every utterance
    pub fn language(&self) -> String {
        let tag = self.get_string("speech", "language", DEFAULT_LANGUAGE);
        if tag.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            tag
        }
    }

    /// Voice defaults; unset or invalid keys fall back to built-in defaults
    pub fn voice_options(&self) -> VoiceOptions {
        VoiceOptions {
            pitch: self.get_float("speech", "pitch").filter(|p| *p > 0.0),
            rate: self.get_float("speech", "rate").filter(|r| *r > 0.0),
            volume: self
                .get_float("speech", "volume")
                .filter(|v| (0.0..=1.0).contains(v)),
            voice: self
                .ini
                .get_from(Some("speech"), "voice")
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string),
        }
    }

    /// Directory for symbols and phrases
    pub fn data_dir(&self) -> PathBuf {
        self.ini
            .get_from(Some("storage"), "data_dir")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(JsonStore::default_dir)
    }

    /// How many spoken phrases to remember
    pub fn recent_phrases_limit(&self) -> usize {
        self.get_int("history", "recent_phrases", 20).max(1) as usize
    }

    /// How many recently picked symbols to offer
    pub fn recent_symbols_limit(&self) -> usize {
        self.get_int("history", "recent_symbols", 6).max(1) as usize
    }
}
