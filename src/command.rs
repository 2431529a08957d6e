//! Commands understood by the interactive front end
//!
//! Each line typed at the prompt maps to one [`Command`]. Indices are shown
//! to the user starting at 1 and converted to zero-based here.

use crate::{Result, SymspeakError};

/// Keys `set` accepts, all in the `[speech]` section
pub const SPEECH_KEYS: &[&str] = &["pitch", "rate", "volume", "voice", "language"];

/// Action identifier for a prompt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Browsing
    Categories,
    List(String),
    Search(String),

    // Sentence editing
    Add(String),
    Remove(usize),
    Move(usize, usize),
    Clear,
    Undo,
    Redo,

    // Speech
    Speak,
    Stop,
    Say(String),

    // Phrases
    Save,
    Phrases,
    Use(usize),
    Forget(usize),
    Recent,
    Again(usize),

    // Custom symbols
    Custom(String),
    Rename(String, String),
    Order(usize, usize),
    Delete(String),

    // Therapy
    Stats,
    Goal(String),
    Goals,
    Done(usize),
    Session(u32, String),
    Sessions,

    /// Change a `[speech]` setting
    Set(String, String),
    Help,
    Quit,
}

/// Help text listing every command
pub const HELP: &str = "\
categories          list symbol categories
list <category>     show the symbols of a category
search <text>       find symbols by name
add <id>            append a symbol to the sentence
remove <n>          remove the n-th symbol
move <from> <to>    move a symbol
clear               empty the sentence
undo / redo         step through sentence history
speak               read the sentence aloud (again to stop)
stop                stop speaking
say <text>          read free text aloud
save                save the sentence as a phrase
phrases             list saved phrases
use <n>             put a saved phrase on the strip
forget <n>          delete a saved phrase
recent              list recently spoken sentences
again <n>           put a recent sentence on the strip
custom <name>       create a custom symbol
rename <id> <name>  rename a custom symbol
order <from> <to>   move a custom symbol in the list
delete <id>         delete a custom symbol
stats               usage statistics
goal <text>         add a therapy goal
goals               list active and completed goals
done <n>            mark goal n completed (again to reopen)
session <min> <notes>  log a therapy session
sessions            list logged sessions
set <key> <value>   change pitch, rate, volume, voice or language
help                this text
quit                save and exit";

impl Command {
    /// Parse a prompt line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "categories" | "cats" => Command::Categories,
            "list" | "ls" => Command::List(rest.to_string()),
            "search" | "find" => Command::Search(rest.to_string()),
            "add" | "a" => Command::Add(required(rest, "symbol id")?),
            "remove" | "rm" => Command::Remove(index(rest)?),
            "move" | "mv" => {
                let (from, to) = positions(rest)?;
                Command::Move(from, to)
            }
            "clear" => Command::Clear,
            "undo" | "u" => Command::Undo,
            "redo" | "r" => Command::Redo,
            "speak" | "s" => Command::Speak,
            "stop" => Command::Stop,
            "say" => Command::Say(required(rest, "text")?),
            "save" => Command::Save,
            "phrases" => Command::Phrases,
            "use" => Command::Use(index(rest)?),
            "forget" => Command::Forget(index(rest)?),
            "recent" => Command::Recent,
            "again" => Command::Again(index(rest)?),
            "custom" => Command::Custom(required(rest, "name")?),
            "rename" => {
                let (id, name) = split_first(rest);
                Command::Rename(required(id, "symbol id")?, required(name, "name")?)
            }
            "order" => {
                let (from, to) = positions(rest)?;
                Command::Order(from, to)
            }
            "delete" => Command::Delete(required(rest, "symbol id")?),
            "stats" => Command::Stats,
            "goal" => Command::Goal(required(rest, "goal text")?),
            "goals" => Command::Goals,
            "done" => Command::Done(index(rest)?),
            "session" => {
                let (minutes, notes) = split_first(rest);
                let minutes = minutes.parse::<u32>().map_err(|_| {
                    SymspeakError::Other(format!("Expected minutes, got '{}'", minutes))
                })?;
                Command::Session(minutes, required(notes, "notes")?)
            }
            "sessions" => Command::Sessions,
            "set" => {
                let (key, value) = split_first(rest);
                let key = key.to_lowercase();
                if !SPEECH_KEYS.contains(&key.as_str()) {
                    return Err(SymspeakError::Other(format!(
                        "Unknown setting '{}', expected one of: {}",
                        key,
                        SPEECH_KEYS.join(", ")
                    )));
                }
                Command::Set(key, required(value, "value")?)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err(SymspeakError::Other("Empty command".into())),
            other => return Err(SymspeakError::Other(format!("Unknown command: {}", other))),
        };
        Ok(command)
    }
}

fn required(rest: &str, what: &str) -> Result<String> {
    if rest.is_empty() {
        Err(SymspeakError::Other(format!("Missing {}", what)))
    } else {
        Ok(rest.to_string())
    }
}

/// First word and the trimmed remainder
fn split_first(rest: &str) -> (&str, &str) {
    match rest.split_once(char::is_whitespace) {
        Some((first, remainder)) => (first, remainder.trim()),
        None => (rest, ""),
    }
}

fn positions(rest: &str) -> Result<(usize, usize)> {
    let mut parts = rest.split_whitespace();
    let from = index(parts.next().unwrap_or(""))?;
    let to = index(parts.next().unwrap_or(""))?;
    Ok((from, to))
}

/// One-based position to index
fn index(arg: &str) -> Result<usize> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(SymspeakError::Other(format!(
            "Expected a position starting at 1, got '{}'",
            arg.trim()
        ))),
    }
}
