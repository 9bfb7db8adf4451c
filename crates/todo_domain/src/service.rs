use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;

use crate::notifications::{AlertRequest, NotificationSink, Permission};
use crate::reminder;
use crate::storage::StorageAdapter;
use crate::store::{self, Command};
use crate::todo::{self, StatusCounts, Todo, TodoDraft};

/// Owns the authoritative todo collection. Constructed once at app
/// start and injected into consumers; every mutation applies a pure
/// reducer command and then flushes the whole collection to storage.
pub struct TodoService {
    todos: RwLock<Vec<Todo>>,
    storage: Option<Box<dyn StorageAdapter>>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

pub struct TodoServiceBuilder {
    storage: Option<Box<dyn StorageAdapter>>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl TodoServiceBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            notification_sink: None,
        }
    }

    pub fn with_storage(mut self, storage: Box<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn build(self) -> TodoService {
        let todos = self
            .storage
            .as_ref()
            .map(|storage| storage.load())
            .unwrap_or_default();
        TodoService {
            todos: RwLock::new(todos),
            storage: self.storage,
            notification_sink: self.notification_sink,
        }
    }
}

impl Default for TodoServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoService {
    pub fn builder() -> TodoServiceBuilder {
        TodoServiceBuilder::new()
    }

    /// Snapshot of the current collection, in storage order.
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Todo> {
        self.todos.read().iter().find(|todo| todo.id == id).cloned()
    }

    pub fn status_counts(&self) -> StatusCounts {
        todo::status_counts(&self.todos.read())
    }

    /// Creates a todo from the draft, appending it with `order` equal
    /// to the collection length at the time of the call.
    pub fn add(&self, draft: TodoDraft) -> Todo {
        let now = Utc::now();
        let mut todos = self.todos.write();
        let todo = Todo::new(draft, todos.len() as i64, now);
        let next = store::apply(std::mem::take(&mut *todos), Command::Add(todo.clone()));
        *todos = next;
        self.persist(&todos);
        todo
    }

    /// Overwrites the editable fields of an existing todo; silently
    /// does nothing for an unknown id.
    pub fn update(&self, id: &str, draft: TodoDraft) {
        self.commit(Command::Update {
            id: id.to_string(),
            draft,
            at: Utc::now(),
        });
    }

    pub fn delete(&self, id: &str) {
        self.commit(Command::Delete { id: id.to_string() });
    }

    pub fn toggle_status(&self, id: &str) {
        self.commit(Command::ToggleStatus {
            id: id.to_string(),
            at: Utc::now(),
        });
    }

    /// Accepts the full collection in the desired sequence and rewrites
    /// `order` to the dense positional index.
    pub fn reorder(&self, sequence: Vec<Todo>) {
        self.commit(Command::Reorder {
            sequence,
            at: Utc::now(),
        });
    }

    pub fn mark_notified(&self, id: &str) {
        self.commit(Command::MarkNotified {
            id: id.to_string(),
            at: Utc::now(),
        });
    }

    /// One scanner tick: raise an alert for every todo whose reminder
    /// matches `now`, marking it notified only when the sink actually
    /// delivered. Returns the number of alerts raised.
    pub fn scan_reminders(&self, now: DateTime<Local>) -> usize {
        let Some(sink) = &self.notification_sink else {
            return 0;
        };
        if sink.permission() != Permission::Granted {
            tracing::debug!("notification permission not granted, skipping scan");
            return 0;
        }

        let due: Vec<Todo> = self
            .todos
            .read()
            .iter()
            .filter(|todo| reminder::due_for_alert(todo, now))
            .cloned()
            .collect();

        let mut fired = 0;
        for todo in due {
            if sink.raise(AlertRequest::for_todo(&todo)) {
                self.mark_notified(&todo.id);
                fired += 1;
            } else {
                tracing::debug!(id = %todo.id, "alert delivery refused, leaving todo unnotified");
            }
        }
        fired
    }

    fn commit(&self, command: Command) {
        let mut todos = self.todos.write();
        let next = store::apply(std::mem::take(&mut *todos), command);
        *todos = next;
        self.persist(&todos);
    }

    fn persist(&self, todos: &[Todo]) {
        if let Some(storage) = &self.storage {
            storage.save(todos);
        }
    }
}
