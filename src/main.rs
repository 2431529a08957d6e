//! symspeak main entry point
//!
//! A line-oriented front end: each prompt line is one command. While a
//! sentence or free text is spoken, events are followed one at a time and
//! the strip is redrawn with the spoken symbol or word marked.

use anyhow::Context;
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use std::process;
use symspeak::command::{Command, HELP};
use symspeak::editor::SpeakToggle;
use symspeak::goals::Goal;
use symspeak::speech::Completion;
use symspeak::state::State;
use symspeak::symbol::{display_text, Sentence, CUSTOM_CATEGORY};
use symspeak::{catalog, APP_NAME, VERSION};
use unicode_width::UnicodeWidthStr;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");
    let silent = args.iter().any(|arg| arg == "--silent");

    if debug_mode {
        // Debug mode: write to symspeak.log
        use std::fs::OpenOptions;
        let log_name = format!("{}.log", APP_NAME);
        match OpenOptions::new().create(true).append(true).open(&log_name) {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open {} for debug logging: {}", log_name, e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!("{} version {} starting (debug mode)", APP_NAME, VERSION);
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(silent) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(silent: bool) -> anyhow::Result<()> {
    let mut state = State::new(silent).context("Failed to initialize")?;
    info!("State initialized - config from {:?}", state.config.path());

    println!("{} {} - type 'help' for commands", APP_NAME, VERSION);
    if !state.playback.is_supported() {
        println!("(text-to-speech is not available on this system)");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        state.pump();
        render_strip(&state);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        debug!("Command: {:?}", command);

        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(&mut state, command) {
            println!("{}", e);
        }
    }

    state.playback.stop();
    state.persist().context("Failed to save state")?;
    info!("{} exiting", APP_NAME);
    Ok(())
}

fn execute(state: &mut State, command: Command) -> symspeak::Result<()> {
    match command {
        Command::Categories => {
            for category in catalog::CATEGORIES {
                println!("{:<10} {}", category.id, category.name);
            }
            println!("{:<10} {}", CUSTOM_CATEGORY, catalog::CUSTOM_CATEGORY_NAME);
        }
        Command::List(category) => {
            let symbols = if category.is_empty() {
                state.editor.recent_symbols().to_vec()
            } else {
                state.symbols_in(&category)
            };
            if symbols.is_empty() {
                println!("No symbols");
            }
            for symbol in symbols {
                println!("{:<12} {} {}", symbol.id, symbol.glyph(), symbol.name);
            }
        }
        Command::Search(term) => {
            let all = catalog::all_symbols(state.library.symbols());
            for symbol in catalog::search(&all, &term) {
                println!("{:<12} {} {}", symbol.id, symbol.glyph(), symbol.name);
            }
        }
        Command::Add(id) => match state.resolve(&id) {
            Some(symbol) => state.editor.select_symbol(symbol),
            None => println!("No symbol '{}'", id),
        },
        Command::Remove(index) => state.editor.remove_symbol(index),
        Command::Move(from, to) => state.editor.reorder_symbol(from, to),
        Command::Clear => state.editor.clear(),
        Command::Undo => state.editor.undo(),
        Command::Redo => state.editor.redo(),
        Command::Speak => match state.toggle_sentence()? {
            SpeakToggle::Started(done) => {
                state.follow_speech(render_strip);
                report(done);
            }
            SpeakToggle::Stopped => println!("Stopped"),
            SpeakToggle::Idle => println!("Nothing to say"),
        },
        Command::Stop => state.playback.stop(),
        Command::Say(text) => {
            state.composer.set_text(&text);
            if let SpeakToggle::Started(done) = state.toggle_text()? {
                state.follow_speech(render_text);
                report(done);
            }
        }
        Command::Save => {
            if state.save_phrase() {
                println!("Saved");
            } else {
                println!("Not saved (empty or already saved)");
            }
        }
        Command::Phrases => print_phrases(state.saved.phrases()),
        Command::Use(index) => {
            if state.use_saved(index).is_none() {
                println!("No phrase {}", index + 1);
            }
        }
        Command::Forget(index) => {
            if state.saved.delete(index).is_none() {
                println!("No phrase {}", index + 1);
            }
        }
        Command::Recent => print_phrases(state.recent.phrases()),
        Command::Again(index) => {
            if state.use_recent(index).is_none() {
                println!("No recent phrase {}", index + 1);
            }
        }
        Command::Custom(name) => {
            let symbol = state.library.add(&name, "");
            println!("Created {} ({})", symbol.id, symbol.name);
        }
        Command::Rename(id, name) => {
            let Some(mut symbol) = state.library.get(&id).cloned() else {
                println!("No custom symbol '{}'", id);
                return Ok(());
            };
            symbol.name = name;
            state.library.update(symbol);
        }
        Command::Order(from, to) => {
            if from >= state.library.len() || to >= state.library.len() {
                println!("Only {} custom symbols", state.library.len());
            } else {
                state.library.reorder(from, to);
            }
        }
        Command::Delete(id) => {
            if state.library.delete(&id).is_none() {
                println!("No custom symbol '{}'", id);
            }
        }
        Command::Stats => {
            let stats = state.stats();
            println!("Phrases: {}", stats.total_phrases);
            println!("Average length: {}", stats.avg_length);
            println!("Vocabulary: {}", stats.unique_vocab);
            for (name, count) in stats.top_categories(5) {
                println!("  {:<16} {}", name, count);
            }
            for (name, count) in stats.top_symbols(5) {
                println!("  {:<16} {}", name, count);
            }
        }
        Command::Goal(text) => {
            if state.goals.add(&text).is_none() {
                println!("Goal text is empty");
            }
        }
        Command::Goals => {
            println!("Active:");
            print_goals(state.goals.goals(), false);
            println!("Completed:");
            print_goals(state.goals.goals(), true);
        }
        Command::Done(index) => {
            let Some(id) = state.goals.get(index).map(|g| g.id.clone()) else {
                println!("No goal {}", index + 1);
                return Ok(());
            };
            if let Some(goal) = state.goals.toggle(&id) {
                let status = if goal.is_completed { "completed" } else { "reopened" };
                println!("{} {}", goal.text, status);
            }
        }
        Command::Session(minutes, notes) => {
            if state.sessions.add(Some(minutes), &notes).is_none() {
                println!("Session notes are empty");
            }
        }
        Command::Sessions => {
            if state.sessions.is_empty() {
                println!("No sessions");
            }
            for session in state.sessions.sessions() {
                println!("{}  {:>3} min  {}", day(&session.date), session.duration, session.notes);
            }
        }
        Command::Set(key, value) => {
            state.set_speech_option(&key, &value)?;
            println!("{} = {}", key, value);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn print_phrases(phrases: &[Sentence]) {
    if phrases.is_empty() {
        println!("No phrases");
    }
    for (i, phrase) in phrases.iter().enumerate() {
        println!("{:>3}. {}", i + 1, display_text(phrase));
    }
}

/// Goals in their stored order, numbered by position in the full list
fn print_goals(goals: &[Goal], completed: bool) {
    let mut any = false;
    for (i, goal) in goals.iter().enumerate() {
        if goal.is_completed != completed {
            continue;
        }
        any = true;
        let when = goal.date_completed.as_deref().unwrap_or(&goal.date_added);
        println!("{:>3}. {}  ({})", i + 1, goal.text, day(when));
    }
    if !any {
        println!("  none");
    }
}

/// Date part of an RFC 3339 timestamp
fn day(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Print why speech failed, if it did
fn report(done: Completion) {
    if let Some(Err(e)) = done.try_take() {
        println!("{}", e);
    }
}

/// Print the sentence with a marker under the symbol being spoken
fn render_strip(state: &State) {
    let sentence = state.editor.sentence();
    if sentence.is_empty() {
        return;
    }

    let mut line = String::new();
    let mut marker = String::new();
    let speaking = state.editor.speaking_index();
    for (i, symbol) in sentence.iter().enumerate() {
        let cell = format!("[{} {}]", symbol.glyph(), symbol.name);
        let width = cell.width();
        let mark = if speaking == Some(i) { '^' } else { ' ' };
        line.push_str(&cell);
        line.push(' ');
        marker.extend(std::iter::repeat(mark).take(width));
        marker.push(' ');
    }
    println!("{}", line);
    if speaking.is_some() {
        println!("{}", marker.trim_end());
    }
}

/// Print free text with a marker under the word being spoken
fn render_text(state: &State) {
    let speaking = state.composer.speaking_word();
    let mut line = String::new();
    let mut marker = String::new();
    for segment in state.composer.segments() {
        let width = segment.text.width();
        let mark = if speaking.is_some() && segment.word == speaking { '^' } else { ' ' };
        line.push_str(&segment.text);
        marker.extend(std::iter::repeat(mark).take(width));
    }
    println!("{}", line);
    println!("{}", marker.trim_end());
}
