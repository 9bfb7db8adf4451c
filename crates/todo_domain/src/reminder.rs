use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local, Timelike};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::service::TodoService;
use crate::todo::{Status, Todo};

/// Display state of a todo's reminder, computed for presentation only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReminderState {
    None,
    Scheduled,
    Missed,
    Notified,
}

pub fn is_due_today(todo: &Todo, now: DateTime<Local>) -> bool {
    todo.due_date == now.date_naive()
}

/// Whether the scanner should fire for this todo at `now`. Unlike the
/// display classifier this is status-aware: completed todos never fire.
/// The match is scoped to today and truncated to the minute.
pub fn due_for_alert(todo: &Todo, now: DateTime<Local>) -> bool {
    let Some(reminder) = todo.reminder_time else {
        return false;
    };
    if todo.notified_at.is_some() || todo.status == Status::Done {
        return false;
    }
    is_due_today(todo, now)
        && reminder.hour() == now.time().hour()
        && reminder.minute() == now.time().minute()
}

/// Pure display classification; ignores status on purpose, so a done
/// todo with an elapsed reminder still reads as missed.
pub fn classify(todo: &Todo, now: DateTime<Local>) -> ReminderState {
    let Some(reminder) = todo.reminder_time else {
        return ReminderState::None;
    };
    if todo.notified_at.is_some() {
        return ReminderState::Notified;
    }

    let today = now.date_naive();
    if todo.due_date < today {
        return ReminderState::Missed;
    }
    if todo.due_date > today {
        return ReminderState::Scheduled;
    }

    let instant = todo.due_date.and_time(reminder);
    if now.naive_local() > instant {
        ReminderState::Missed
    } else {
        ReminderState::Scheduled
    }
}

/// Wall-clock source, injectable so scanner behaviour is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Recurring reminder evaluation: one pass immediately at spawn, then
/// one per poll interval until stopped or dropped.
pub struct ReminderScanner {
    shutdown: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl ReminderScanner {
    pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

    pub fn spawn(service: Arc<TodoService>, clock: Arc<dyn Clock>) -> Self {
        Self::spawn_with_interval(service, clock, Self::POLL_INTERVAL)
    }

    pub fn spawn_with_interval(
        service: Arc<TodoService>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        let shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            let (stopped, signal) = &*thread_shutdown;
            loop {
                let fired = service.scan_reminders(clock.now());
                if fired > 0 {
                    tracing::debug!(fired, "reminder scan fired alerts");
                }
                let mut guard = stopped.lock();
                if *guard {
                    break;
                }
                let _ = signal.wait_for(&mut guard, interval);
                if *guard {
                    break;
                }
            }
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops polling and joins the worker thread. Idempotent.
    pub fn stop(&mut self) {
        let (stopped, signal) = &*self.shutdown;
        *stopped.lock() = true;
        signal.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReminderScanner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoDraft;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 30)
            .single()
            .expect("unambiguous local time")
    }

    fn todo_due(y: i32, mo: u32, d: u32, reminder: Option<(u32, u32)>) -> Todo {
        let mut draft = TodoDraft::new("todo", NaiveDate::from_ymd_opt(y, mo, d).unwrap());
        if let Some((h, m)) = reminder {
            draft = draft.reminder_time(NaiveTime::from_hms_opt(h, m, 0).unwrap());
        }
        Todo::new(draft, 0, Utc::now())
    }

    #[test]
    fn no_reminder_classifies_as_none() {
        let todo = todo_due(2026, 4, 10, None);
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 9, 0)),
            ReminderState::None
        );
    }

    #[test]
    fn notified_overrides_everything_else() {
        let mut todo = todo_due(2026, 4, 9, Some((9, 0)));
        todo.notified_at = Some(Utc::now());
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 9, 0)),
            ReminderState::Notified
        );
    }

    #[test]
    fn past_due_date_is_missed_regardless_of_time() {
        let todo = todo_due(2026, 4, 9, Some((23, 59)));
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 0, 1)),
            ReminderState::Missed
        );
    }

    #[test]
    fn future_due_date_is_scheduled() {
        let todo = todo_due(2026, 4, 11, Some((0, 0)));
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 23, 59)),
            ReminderState::Scheduled
        );
    }

    #[test]
    fn today_flips_from_scheduled_to_missed_at_the_reminder_instant() {
        let todo = todo_due(2026, 4, 10, Some((9, 0)));
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 8, 59)),
            ReminderState::Scheduled
        );
        assert_eq!(
            classify(&todo, local(2026, 4, 10, 9, 1)),
            ReminderState::Missed
        );
    }

    #[test]
    fn alert_fires_only_on_the_matching_minute_of_the_due_day() {
        let todo = todo_due(2026, 4, 10, Some((9, 0)));
        assert!(due_for_alert(&todo, local(2026, 4, 10, 9, 0)));
        assert!(!due_for_alert(&todo, local(2026, 4, 10, 9, 1)));
        // Matching time on the wrong day never fires.
        assert!(!due_for_alert(&todo, local(2026, 4, 11, 9, 0)));
        assert!(!due_for_alert(&todo, local(2026, 4, 9, 9, 0)));
    }

    #[test]
    fn done_todos_never_fire_but_still_classify() {
        let mut todo = todo_due(2026, 4, 10, Some((9, 0)));
        todo.status = Status::Done;
        let at = local(2026, 4, 10, 9, 0);
        assert!(!due_for_alert(&todo, at));
        // Display state deliberately ignores status.
        assert_eq!(classify(&todo, at), ReminderState::Missed);
    }

    #[test]
    fn already_notified_todos_never_fire_again() {
        let mut todo = todo_due(2026, 4, 10, Some((9, 0)));
        todo.notified_at = Some(Utc::now());
        assert!(!due_for_alert(&todo, local(2026, 4, 10, 9, 0)));
    }
}
