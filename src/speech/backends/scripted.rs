//! In-memory speech engine
//!
//! Records every utterance instead of producing audio. A [`ScriptHandle`]
//! shared with the engine lets tests play the engine's side: report
//! boundaries, finish, fail.
//!
//! In narrating mode (the `--silent` mode of the binary) nothing is
//! recorded; a worker thread reports a boundary at the start of every word,
//! one word per `word_time`, then ends the utterance unless it was
//! cancelled first.

use crate::speech::boundary::BoundaryTable;
use crate::speech::engine::{EngineEvent, EventSender, SpeechEngine, TaggedEvent};
use crate::speech::voice::Utterance;
use crate::Result;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct Script {
    events: Option<EventSender>,
    spoken: Vec<Utterance>,
    active: Option<u64>,
    cancels: usize,
    /// Bumped on every enqueue and cancel; a narrator stops once it moves on
    generation: u64,
}

impl Script {
    fn send(&self, token: u64, event: EngineEvent) {
        if let Some(tx) = self.events.as_ref() {
            let _ = tx.send(TaggedEvent::new(token, event));
        }
    }
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(|e| e.into_inner())
}

/// Engine that only records what it is asked to say
pub struct ScriptedEngine {
    script: Arc<Mutex<Script>>,
    /// Time spent on each word when narrating
    narrate: Option<Duration>,
}

/// Host-side control over a [`ScriptedEngine`]
#[derive(Clone)]
pub struct ScriptHandle {
    script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    /// Engine that waits for the handle to drive every event
    pub fn new() -> (Self, ScriptHandle) {
        let script = Arc::new(Mutex::new(Script::default()));
        let handle = ScriptHandle {
            script: Arc::clone(&script),
        };
        (
            Self {
                script,
                narrate: None,
            },
            handle,
        )
    }

    /// Engine that reports word boundaries and ends by itself
    pub fn narrating(word_time: Duration) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            narrate: Some(word_time),
        }
    }

    fn spawn_narrator(&self, utterance: &Utterance, generation: u64, word_time: Duration) {
        let script = Arc::clone(&self.script);
        let token = utterance.token;
        let starts = BoundaryTable::for_words(&utterance.text).starts();

        thread::spawn(move || {
            for start in starts {
                {
                    let script = lock(&script);
                    if script.generation != generation {
                        return;
                    }
                    script.send(token, EngineEvent::Boundary { char_index: start });
                }
                thread::sleep(word_time);
            }

            let mut script = lock(&script);
            if script.generation == generation && script.active.take().is_some() {
                script.send(token, EngineEvent::End);
            }
        });
    }
}

impl SpeechEngine for ScriptedEngine {
    fn subscribe(&mut self, events: EventSender) {
        lock(&self.script).events = Some(events);
    }

    fn enqueue(&mut self, utterance: Utterance) -> Result<()> {
        debug!("Scripted utterance {}: {}", utterance.token, utterance.text);
        let generation = {
            let mut script = lock(&self.script);
            script.generation += 1;
            script.active = Some(utterance.token);
            script.generation
        };

        match self.narrate {
            Some(word_time) => self.spawn_narrator(&utterance, generation, word_time),
            None => lock(&self.script).spoken.push(utterance),
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        let mut script = lock(&self.script);
        script.cancels += 1;
        script.generation += 1;
        // A cancelled utterance still reports its end, like a real engine
        if let Some(token) = script.active.take() {
            script.send(token, EngineEvent::End);
        }
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        lock(&self.script).active.is_some()
    }
}

impl ScriptHandle {
    /// Report that speech reached `char_index` of the active utterance
    pub fn boundary(&self, char_index: usize) {
        let script = lock(&self.script);
        if let Some(token) = script.active {
            script.send(token, EngineEvent::Boundary { char_index });
        }
    }

    /// Finish the active utterance normally
    pub fn finish(&self) {
        let mut script = lock(&self.script);
        if let Some(token) = script.active.take() {
            script.send(token, EngineEvent::End);
        }
    }

    /// Fail the active utterance
    pub fn fail(&self, message: &str) {
        let mut script = lock(&self.script);
        if let Some(token) = script.active.take() {
            script.send(token, EngineEvent::Error(message.to_string()));
        }
    }

    /// Send an arbitrary event, even for an utterance no longer active
    pub fn send(&self, token: u64, event: EngineEvent) {
        lock(&self.script).send(token, event);
    }

    /// Every utterance enqueued so far
    pub fn utterances(&self) -> Vec<Utterance> {
        lock(&self.script).spoken.clone()
    }

    /// The most recent utterance
    pub fn last(&self) -> Option<Utterance> {
        lock(&self.script).spoken.last().cloned()
    }

    /// How many times the engine was asked to cancel
    pub fn cancel_count(&self) -> usize {
        lock(&self.script).cancels
    }
}
