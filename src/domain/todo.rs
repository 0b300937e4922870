//! Onboarding checklist attached to every client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::ClientPreferences;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

const DEFAULT_TODOS: [&str; 10] = [
    "Client Colors and Font set",
    "Max guests set",
    "Image uploaded to blob server",
    "All listings wix page completed",
    "Dynamic pages completed",
    "Search bar connected",
    "Target domain set to iframe code",
    "Page size set for all listing and single page",
    "Headers size checked",
    "Mobile size check",
];

/// The checklist every new client starts with.
pub fn default_todos(now: DateTime<Utc>) -> Vec<Todo> {
    DEFAULT_TODOS
        .iter()
        .enumerate()
        .map(|(index, text)| Todo {
            id: format!("default-{}", index + 1),
            text: (*text).to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
        })
        .collect()
}

impl ClientPreferences {
    /// Replaces an empty checklist with the default one.
    pub fn ensure_todos(&mut self, now: DateTime<Utc>) {
        if self.todos.is_empty() {
            self.todos = default_todos(now);
        }
    }

    pub fn add_todo(&mut self, id: String, text: String, now: DateTime<Utc>) {
        self.todos.push(Todo {
            id,
            text,
            completed: false,
            created_at: now,
            completed_at: None,
        });
    }

    /// Flips completion of a todo. Returns `false` when no todo has that id.
    pub fn toggle_todo(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                todo.completed_at = todo.completed.then_some(now);
                true
            }
            None => false,
        }
    }

    /// Removes a todo. Returns `false` when no todo has that id.
    pub fn remove_todo(&mut self, id: &str) -> bool {
        let before = self.todos.len();
        self.todos.retain(|todo| todo.id != id);
        self.todos.len() != before
    }

    pub fn completed_todos(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn defaults_have_stable_ids() {
        let todos = default_todos(now());
        assert_eq!(todos.len(), 10);
        assert_eq!(todos[0].id, "default-1");
        assert_eq!(todos[0].text, "Client Colors and Font set");
        assert_eq!(todos[9].id, "default-10");
        assert!(todos.iter().all(|t| !t.completed && t.completed_at.is_none()));
    }

    #[test]
    fn ensure_todos_keeps_existing_lists() {
        let mut prefs = ClientPreferences::default();
        prefs.add_todo("custom".into(), "Custom".into(), now());
        prefs.ensure_todos(now());
        assert_eq!(prefs.todos.len(), 1);

        let mut empty = ClientPreferences::default();
        empty.ensure_todos(now());
        assert_eq!(empty.todos.len(), 10);
    }

    #[test]
    fn toggle_sets_and_clears_completion_time() {
        let mut prefs = ClientPreferences::default();
        prefs.ensure_todos(now());

        assert!(prefs.toggle_todo("default-2", now()));
        assert!(prefs.todos[1].completed);
        assert_eq!(prefs.todos[1].completed_at, Some(now()));
        assert_eq!(prefs.completed_todos(), 1);

        assert!(prefs.toggle_todo("default-2", now()));
        assert!(!prefs.todos[1].completed);
        assert_eq!(prefs.todos[1].completed_at, None);

        assert!(!prefs.toggle_todo("missing", now()));
    }

    #[test]
    fn remove_reports_missing_ids() {
        let mut prefs = ClientPreferences::default();
        prefs.ensure_todos(now());
        assert!(prefs.remove_todo("default-1"));
        assert!(!prefs.remove_todo("default-1"));
        assert_eq!(prefs.todos.len(), 9);
    }
}
