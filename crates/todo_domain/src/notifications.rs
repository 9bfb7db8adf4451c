use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::todo::Todo;

/// User consent for raising alerts, mirroring the tri-state exposed by
/// desktop notification backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not yet decided; the sink may prompt.
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertRequest {
    pub title: String,
    pub body: String,
    /// De-duplication tag; the todo id, so repeated alerts for the same
    /// item coalesce at the OS level.
    pub tag: String,
}

impl AlertRequest {
    pub fn for_todo(todo: &Todo) -> Self {
        Self {
            title: "Todo reminder".to_string(),
            body: format!("{}\nDue: {}", todo.title, format_due_date(todo.due_date)),
            tag: todo.id.clone(),
        }
    }
}

fn format_due_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Platform-specific notification adapters will implement this trait.
/// Adapters should bring the application to the foreground and dismiss
/// the alert when the user clicks it.
pub trait NotificationSink: Send + Sync {
    fn permission(&self) -> Permission;

    /// Prompt the user if consent is still undecided.
    fn request_permission(&self) -> Permission {
        self.permission()
    }

    /// Raise the alert. Returns false when delivery was refused or
    /// unavailable; the caller must not treat the todo as notified in
    /// that case.
    fn raise(&self, request: AlertRequest) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoDraft;
    use chrono::Utc;

    #[test]
    fn alert_carries_title_due_date_and_id_tag() {
        let todo = Todo::new(
            TodoDraft::new("Water plants", NaiveDate::from_ymd_opt(2026, 7, 9).unwrap()),
            0,
            Utc::now(),
        );
        let request = AlertRequest::for_todo(&todo);
        assert_eq!(request.tag, todo.id);
        assert!(request.body.contains("Water plants"));
        assert!(request.body.contains("2026/07/09"));
    }
}
