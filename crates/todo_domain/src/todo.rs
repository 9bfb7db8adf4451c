use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Priority as stored on the wire: 1 = high, 2 = medium, 3 = low.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Error)]
#[error("priority out of range: {0}")]
pub struct InvalidPriority(pub u8);

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(InvalidPriority(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Default for Status {
    fn default() -> Self {
        Status::Todo
    }
}

impl Status {
    /// One step along the fixed toggle cycle todo -> inprogress -> done -> todo.
    pub fn advance(self) -> Self {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::Todo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, with = "reminder_time_format")]
    pub reminder_time: Option<NaiveTime>,
    #[serde(default)]
    pub notified_at: Option<DateTime<Utc>>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(draft: TodoDraft, order: i64, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: draft.status,
            reminder_time: draft.reminder_time,
            notified_at: None,
            order,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Pre-validated input for create and edit operations. Input validation
/// (non-empty title, parseable date) happens at the form boundary; the
/// draft only carries the defaulting rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    pub reminder_time: Option<NaiveTime>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date,
            priority: Priority::default(),
            status: Status::default(),
            reminder_time: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn reminder_time(mut self, time: NaiveTime) -> Self {
        self.reminder_time = Some(time);
        self
    }
}

/// Reminder times serialize as "HH:MM", with the empty string standing
/// in for "no reminder" to keep the stored blob compatible.
mod reminder_time_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(Status),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortKey {
    /// User-controlled sequence, ascending by the `order` field.
    Manual,
    DueDateAsc,
    DueDateDesc,
    PriorityHighFirst,
    PriorityLowFirst,
    NewestFirst,
}

/// Presentation helper: apply a status filter, then sort. Never touches
/// the stored collection.
pub fn filter_and_sort(todos: &[Todo], filter: StatusFilter, key: SortKey) -> Vec<Todo> {
    let mut selected: Vec<Todo> = todos
        .iter()
        .filter(|todo| match filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => todo.status == status,
        })
        .cloned()
        .collect();

    match key {
        SortKey::Manual => selected.sort_by_key(|todo| todo.order),
        SortKey::DueDateAsc => selected.sort_by_key(|todo| todo.due_date),
        SortKey::DueDateDesc => selected.sort_by_key(|todo| std::cmp::Reverse(todo.due_date)),
        SortKey::PriorityHighFirst => selected.sort_by_key(|todo| todo.priority),
        SortKey::PriorityLowFirst => selected.sort_by_key(|todo| std::cmp::Reverse(todo.priority)),
        SortKey::NewestFirst => selected.sort_by_key(|todo| std::cmp::Reverse(todo.created_at)),
    }
    selected
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

pub fn status_counts(todos: &[Todo]) -> StatusCounts {
    let mut counts = StatusCounts {
        all: todos.len(),
        ..StatusCounts::default()
    };
    for todo in todos {
        match todo.status {
            Status::Todo => counts.todo += 1,
            Status::InProgress => counts.in_progress += 1,
            Status::Done => counts.done += 1,
        }
    }
    counts
}
