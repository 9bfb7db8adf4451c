use chrono::{DateTime, Utc};

use crate::todo::{Todo, TodoDraft};

/// Tagged mutation over the collection. Timestamps travel inside the
/// command so that `apply` stays a deterministic pure transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Todo),
    Update {
        id: String,
        draft: TodoDraft,
        at: DateTime<Utc>,
    },
    Delete {
        id: String,
    },
    ToggleStatus {
        id: String,
        at: DateTime<Utc>,
    },
    /// Full collection in the desired sequence; positions become the
    /// new `order` values.
    Reorder {
        sequence: Vec<Todo>,
        at: DateTime<Utc>,
    },
    MarkNotified {
        id: String,
        at: DateTime<Utc>,
    },
}

/// Produces the next collection snapshot. Commands addressing an
/// unknown id leave the collection unchanged.
pub fn apply(state: Vec<Todo>, command: Command) -> Vec<Todo> {
    match command {
        Command::Add(todo) => {
            let mut next = state;
            next.push(todo);
            next
        }
        Command::Update { id, draft, at } => state
            .into_iter()
            .map(|todo| {
                if todo.id == id {
                    Todo {
                        title: draft.title.clone(),
                        description: draft.description.clone(),
                        due_date: draft.due_date,
                        priority: draft.priority,
                        status: draft.status,
                        reminder_time: draft.reminder_time,
                        updated_at: at,
                        ..todo
                    }
                } else {
                    todo
                }
            })
            .collect(),
        Command::Delete { id } => state.into_iter().filter(|todo| todo.id != id).collect(),
        Command::ToggleStatus { id, at } => state
            .into_iter()
            .map(|mut todo| {
                if todo.id == id {
                    todo.status = todo.status.advance();
                    todo.updated_at = at;
                }
                todo
            })
            .collect(),
        Command::Reorder { sequence, at } => sequence
            .into_iter()
            .enumerate()
            .map(|(index, mut todo)| {
                todo.order = index as i64;
                todo.updated_at = at;
                todo
            })
            .collect(),
        Command::MarkNotified { id, at } => state
            .into_iter()
            .map(|mut todo| {
                // First call wins; a fired reminder is never re-stamped.
                if todo.id == id && todo.notified_at.is_none() {
                    todo.notified_at = Some(at);
                    todo.updated_at = at;
                }
                todo
            })
            .collect(),
    }
}

/// The persisted blob is the bare array of todos.
pub fn to_json(todos: &[Todo]) -> serde_json::Result<String> {
    serde_json::to_string(todos)
}

pub fn from_json(raw: &str) -> serde_json::Result<Vec<Todo>> {
    serde_json::from_str(raw)
}
