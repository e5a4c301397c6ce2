use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::parse_date;
use crate::clock::ceil_days;
use crate::constants::bills::{DUE_SOON_DAYS, UPCOMING_LIMIT, UPCOMING_WINDOW_DAYS};
use crate::entities::bills;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillState {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl BillState {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due Soon",
            Self::Upcoming => "Upcoming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillStatus {
    pub bill: bills::Model,
    /// `None` when the stored due date cannot be parsed.
    pub days_until_due: Option<i64>,
    pub state: BillState,
}

fn due_instant(due: NaiveDate) -> DateTime<Utc> {
    due.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `ceil((due - now) / day)` with the due date taken as midnight UTC.
#[must_use]
pub fn days_until_due(due: NaiveDate, now: DateTime<Utc>) -> i64 {
    ceil_days(due_instant(due) - now)
}

#[must_use]
pub fn classify_bill(bill: &bills::Model, now: DateTime<Utc>) -> BillStatus {
    let days = parse_date(&bill.due_date).map(|due| days_until_due(due, now));

    let state = match (bill.paid, days) {
        (true, _) => BillState::Paid,
        (false, Some(d)) if d < 0 => BillState::Overdue,
        (false, Some(d)) if d <= DUE_SOON_DAYS => BillState::DueSoon,
        (false, _) => BillState::Upcoming,
    };

    BillStatus {
        bill: bill.clone(),
        days_until_due: days,
        state,
    }
}

/// Unpaid bills due within the next 30 days (overdue included), soonest first,
/// capped at five.
#[must_use]
pub fn upcoming_bills(bills: &[bills::Model], now: DateTime<Utc>) -> Vec<BillStatus> {
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);

    let mut due: Vec<(NaiveDate, &bills::Model)> = bills
        .iter()
        .filter(|b| !b.paid)
        .filter_map(|b| parse_date(&b.due_date).map(|d| (d, b)))
        .filter(|(d, _)| due_instant(*d) <= horizon)
        .collect();

    due.sort_by(|(a, ab), (b, bb)| a.cmp(b).then(ab.id.cmp(&bb.id)));

    due.into_iter()
        .take(UPCOMING_LIMIT)
        .map(|(_, bill)| classify_bill(bill, now))
        .collect()
}
