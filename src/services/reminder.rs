//! Event reminders.
//!
//! Each pass looks at the user's events and fires a notification for every
//! event starting within the window that was not notified during the cooldown.
//! Delivery is at-least-once: an event can fire again on a later pass as long
//! as the cooldown has elapsed and it is still inside the window.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::RemindersConfig;
use crate::db::Store;
use crate::domain::UserId;
use crate::domain::events::NotificationEvent;
use crate::entities::events;

const EVENT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub event_id: i32,
    pub user_id: i32,
    pub title: String,
    pub notes: String,
    pub scheduled_for: DateTime<Utc>,
}

/// Where fired reminders go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

/// Publishes reminders on the event bus.
pub struct EventBusNotifier {
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl EventBusNotifier {
    #[must_use]
    pub const fn new(event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl Notifier for EventBusNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        info!(
            event_id = reminder.event_id,
            title = %reminder.title,
            scheduled_for = %reminder.scheduled_for,
            "Event reminder"
        );
        let _ = self.event_bus.send(NotificationEvent::EventReminder {
            event_id: reminder.event_id,
            user_id: reminder.user_id,
            title: reminder.title.clone(),
            scheduled_for: reminder.scheduled_for.to_rfc3339(),
        });
        Ok(())
    }
}

/// Parses an event's combined `{date}T{HH:MM}` value as UTC.
#[must_use]
pub fn scheduled_at(event: &events::Model) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(&event.datetime, EVENT_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Events due a reminder at `now`.
///
/// An event qualifies when it starts within `[now, now + window]` and was
/// never notified or was last notified at least `cooldown` ago. Events whose
/// datetime cannot be parsed are skipped.
#[must_use]
pub fn due_reminders(
    events: &[events::Model],
    now: DateTime<Utc>,
    window: Duration,
    cooldown: Duration,
) -> Vec<Reminder> {
    let horizon = now + window;

    events
        .iter()
        .filter_map(|event| {
            let Some(at) = scheduled_at(event) else {
                debug!(event_id = event.id, datetime = %event.datetime, "Skipping event with unparseable datetime");
                return None;
            };
            if at < now || at > horizon {
                return None;
            }

            let last = event
                .notified_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc));
            if last.is_some_and(|last| now - last < cooldown) {
                return None;
            }

            Some(Reminder {
                event_id: event.id,
                user_id: event.user_id,
                title: event.title.clone(),
                notes: event.notes.clone(),
                scheduled_for: at,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub checked: usize,
    pub fired: usize,
    /// Notifications are turned off in the user's settings.
    pub suppressed: bool,
}

#[derive(Clone)]
pub struct ReminderService {
    store: Store,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    window: Duration,
    cooldown: Duration,
}

impl ReminderService {
    #[must_use]
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        config: &RemindersConfig,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            window: Duration::minutes(config.window_minutes),
            cooldown: Duration::minutes(config.cooldown_minutes),
        }
    }

    /// One polling pass for the user.
    ///
    /// With notifications disabled nothing fires and nothing is stamped.
    pub async fn run_once(&self, user_id: UserId) -> Result<ReminderReport> {
        let events = self.store.list_events(user_id.value()).await?;
        let mut report = ReminderReport {
            checked: events.len(),
            ..ReminderReport::default()
        };

        let enabled = self
            .store
            .get_settings(user_id.value())
            .await?
            .is_none_or(|s| s.notifications);
        if !enabled {
            report.suppressed = true;
            return Ok(report);
        }

        let now = self.clock.now();
        for reminder in due_reminders(&events, now, self.window, self.cooldown) {
            if let Err(e) = self.notifier.notify(&reminder).await {
                warn!(event_id = reminder.event_id, error = %e, "Failed to deliver reminder");
                continue;
            }
            self.store
                .mark_event_notified(reminder.event_id, &now.to_rfc3339())
                .await?;
            report.fired += 1;
            metrics::counter!("reminders_fired_total").increment(1);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: i32, datetime: &str, notified_at: Option<&str>) -> events::Model {
        events::Model {
            id,
            user_id: 1,
            title: format!("Event {id}"),
            date: datetime[..10].to_string(),
            time: Some(datetime[11..].to_string()),
            notes: String::new(),
            datetime: datetime.to_string(),
            notified_at: notified_at.map(str::to_string),
        }
    }

    fn window() -> (Duration, Duration) {
        (Duration::minutes(15), Duration::minutes(2))
    }

    #[test]
    fn fires_inside_window_only() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let (window, cooldown) = window();
        let events = vec![
            event(1, "2024-05-01T09:10", None),
            event(2, "2024-05-01T09:20", None),
            event(3, "2024-05-01T08:59", None),
            event(4, "2024-05-01T09:15", None),
            event(5, "2024-05-01T09:00", None),
        ];

        let ids: Vec<_> = due_reminders(&events, now, window, cooldown)
            .iter()
            .map(|r| r.event_id)
            .collect();
        assert_eq!(ids, vec![1, 4, 5]);
    }

    #[test]
    fn cooldown_suppresses_repeat() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let (window, cooldown) = window();

        let recent = vec![event(1, "2024-05-01T09:10", Some("2024-05-01T08:59:00+00:00"))];
        assert!(due_reminders(&recent, now, window, cooldown).is_empty());

        let stale = vec![event(1, "2024-05-01T09:10", Some("2024-05-01T08:58:00+00:00"))];
        assert_eq!(due_reminders(&stale, now, window, cooldown).len(), 1);
    }

    #[test]
    fn unparseable_datetimes_are_skipped() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let (window, cooldown) = window();
        let mut broken = event(1, "2024-05-01T09:10", None);
        broken.datetime = "someday".to_string();

        assert!(due_reminders(&[broken], now, window, cooldown).is_empty());
    }
}
