use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use tracing::info;

use todo_domain::notifications::{AlertRequest, NotificationSink, Permission};
use todo_domain::reminder::{ReminderScanner, SystemClock};
use todo_domain::storage::JsonFileStorage;
use todo_domain::TodoService;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("TODO_TRACKER_STORE") {
            config.storage_path = PathBuf::from(path);
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("todos.json"),
        }
    }
}

/// Headless stand-in for a desktop notification backend: consent is
/// always granted and alerts land in the log.
struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn raise(&self, request: AlertRequest) -> bool {
        info!(tag = %request.tag, title = %request.title, body = %request.body, "reminder");
        true
    }
}

/// Builds the service, starts the reminder scanner and keeps it
/// running until the process is killed.
pub fn run(config: AppConfig) -> Result<()> {
    info!(store = %config.storage_path.display(), "starting todo tracker");

    let service = Arc::new(
        TodoService::builder()
            .with_storage(Box::new(JsonFileStorage::new(&config.storage_path)))
            .with_notification_sink(Box::new(LogNotificationSink))
            .build(),
    );

    let counts = service.status_counts();
    info!(
        total = counts.all,
        todo = counts.todo,
        in_progress = counts.in_progress,
        done = counts.done,
        "loaded todo collection"
    );

    let _scanner = ReminderScanner::spawn(Arc::clone(&service), Arc::new(SystemClock));

    loop {
        thread::park();
    }
}
