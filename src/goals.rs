//! Therapy goals and session notes
//!
//! Both lists are kept newest first. Timestamps are RFC 3339 strings in
//! UTC and ids are random UUIDs.

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Something the user is working towards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<String>,
}

/// Notes from one therapy session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub date: String,
    /// Length in minutes
    pub duration: u32,
    pub notes: String,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Goals {
    goals: Vec<Goal>,
}

impl Goals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_goals(goals: Vec<Goal>) -> Self {
        Self { goals }
    }

    /// Add a goal at the front; blank text is ignored
    pub fn add(&mut self, text: &str) -> Option<Goal> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let goal = Goal {
            id: new_id(),
            text: text.to_string(),
            is_completed: false,
            date_added: now(),
            date_completed: None,
        };
        info!("Added goal {}", goal.id);
        self.goals.insert(0, goal.clone());
        Some(goal)
    }

    /// Flip a goal between active and completed
    ///
    /// Completing stamps `date_completed`; reopening clears it.
    pub fn toggle(&mut self, id: &str) -> Option<&Goal> {
        let goal = self.goals.iter_mut().find(|g| g.id == id)?;
        goal.is_completed = !goal.is_completed;
        goal.date_completed = goal.is_completed.then(now);
        debug!("Goal {} completed: {}", goal.id, goal.is_completed);
        Some(goal)
    }

    pub fn active(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.is_completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| g.is_completed)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, index: usize) -> Option<&Goal> {
        self.goals.get(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sessions {
    sessions: Vec<Session>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    /// Log a session at the front
    ///
    /// Needs a duration and non-blank notes; otherwise nothing is logged.
    pub fn add(&mut self, duration: Option<u32>, notes: &str) -> Option<Session> {
        let notes = notes.trim();
        let duration = duration?;
        if notes.is_empty() {
            return None;
        }
        let session = Session {
            id: new_id(),
            date: now(),
            duration,
            notes: notes.to_string(),
        };
        info!("Logged {} minute session {}", session.duration, session.id);
        self.sessions.insert(0, session.clone());
        Some(session)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goals_newest_first() {
        let mut goals = Goals::new();
        assert!(goals.add("   ").is_none());
        goals.add("Pedir água sozinho");
        let second = goals.add(" Usar frases com 3 símbolos ").unwrap();

        assert_eq!(second.text, "Usar frases com 3 símbolos");
        assert_eq!(goals.get(0).unwrap().id, second.id);
        assert!(chrono::DateTime::parse_from_rfc3339(&second.date_added).is_ok());
        assert_eq!(goals.active().count(), 2);
    }

    #[test]
    fn test_toggle_goal() {
        let mut goals = Goals::new();
        let id = goals.add("Cumprimentar colegas").unwrap().id;

        let done = goals.toggle(&id).unwrap();
        assert!(done.is_completed);
        assert!(done.date_completed.is_some());
        assert_eq!(goals.completed().count(), 1);
        assert_eq!(goals.active().count(), 0);

        let reopened = goals.toggle(&id).unwrap();
        assert!(!reopened.is_completed);
        assert!(reopened.date_completed.is_none());

        assert!(goals.toggle("missing").is_none());
    }

    #[test]
    fn test_goal_json_shape() {
        let goal = Goal {
            id: "g1".into(),
            text: "Ler".into(),
            is_completed: false,
            date_added: "2024-03-01T10:00:00+00:00".into(),
            date_completed: None,
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["dateAdded"], "2024-03-01T10:00:00+00:00");
        assert!(json.get("dateCompleted").is_none());
    }

    #[test]
    fn test_sessions() {
        let mut sessions = Sessions::new();
        assert!(sessions.add(None, "notas").is_none());
        assert!(sessions.add(Some(30), "  ").is_none());
        assert!(sessions.is_empty());

        sessions.add(Some(30), "Trabalhou ações");
        let latest = sessions.add(Some(0), " Revisão ").unwrap();
        assert_eq!(latest.notes, "Revisão");
        assert_eq!(sessions.sessions()[0].id, latest.id);
        assert_eq!(sessions.len(), 2);
    }
}
