//! Domain events for the application.
//!
//! These are published on the broadcast event bus so the daemon, the CLI and
//! tests can observe background activity without polling the store.

use serde::Serialize;

/// Events published on the shared event bus.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    SyncStarted {
        pending: usize,
    },
    SyncFinished {
        attempted: usize,
        delivered: usize,
        failed: usize,
    },

    ConnectivityChanged {
        online: bool,
    },

    EventReminder {
        event_id: i32,
        user_id: i32,
        title: String,
        scheduled_for: String,
    },

    LicenseActivated {
        user_id: i32,
        plan: String,
    },
    TrialStarted {
        user_id: i32,
    },

    ImportFinished {
        user_id: i32,
        transactions: usize,
        budgets: usize,
        bills: usize,
        categories: usize,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
