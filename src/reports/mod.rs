//! Read-only aggregation over stored records.
//!
//! Every function here takes a snapshot of rows plus the current moment and
//! returns derived values; nothing touches the store.

pub mod bills;
pub mod budget;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::{TransactionKind, UnknownVariant};
use crate::entities::{categories, transactions};

pub use bills::{BillState, BillStatus, classify_bill, upcoming_bills};
pub use budget::{BudgetState, BudgetStatus, budget_alerts, budget_status};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a stored `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub month_income: f64,
    pub month_expense: f64,
    pub month_remaining: f64,
}

/// All-time totals plus the calendar month containing `today`.
#[must_use]
pub fn dashboard(transactions: &[transactions::Model], today: NaiveDate) -> Dashboard {
    let mut summary = Dashboard::default();

    for tx in transactions {
        let in_month = parse_date(&tx.date)
            .is_some_and(|d| d.year() == today.year() && d.month() == today.month());

        match tx.kind {
            TransactionKind::Income => {
                summary.total_income += tx.amount;
                if in_month {
                    summary.month_income += tx.amount;
                }
            }
            TransactionKind::Expense => {
                summary.total_expense += tx.amount;
                if in_month {
                    summary.month_expense += tx.amount;
                }
            }
        }
    }

    summary.balance = summary.total_income - summary.total_expense;
    summary.month_remaining = summary.month_income - summary.month_expense;
    summary
}

/// Newest first by date, then by id.
#[must_use]
pub fn recent_transactions(
    transactions: &[transactions::Model],
    limit: usize,
) -> Vec<transactions::Model> {
    let mut sorted = transactions.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

fn sort_newest_first(rows: &mut [transactions::Model]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

/// Lower bound on transaction dates for a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPeriod {
    Today,
    Week,
    Month,
    Year,
}

impl FilterPeriod {
    #[must_use]
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Week => today - Duration::days(7),
            Self::Month => today.with_day(1).unwrap_or(today),
            Self::Year => today.with_ordinal(1).unwrap_or(today),
        }
    }
}

impl FromStr for FilterPeriod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(UnknownVariant {
                kind: "filter period",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category_id: Option<i32>,
    pub period: Option<FilterPeriod>,
    /// Case-insensitive substring match against the note.
    pub search: Option<String>,
}

/// Applies every set criterion and returns matches newest first.
#[must_use]
pub fn filter_transactions(
    transactions: &[transactions::Model],
    filter: &TransactionFilter,
    today: NaiveDate,
) -> Vec<transactions::Model> {
    let since = filter.period.map(|p| p.start(today));
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<_> = transactions
        .iter()
        .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
        .filter(|tx| filter.category_id.is_none_or(|id| tx.category_id == id))
        .filter(|tx| {
            since.is_none_or(|since| parse_date(&tx.date).is_some_and(|d| d >= since))
        })
        .filter(|tx| {
            needle
                .as_deref()
                .is_none_or(|n| tx.note.to_lowercase().contains(n))
        })
        .cloned()
        .collect();

    sort_newest_first(&mut matched);
    matched
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: i32,
    pub name: String,
    pub total: f64,
}

/// Expense totals per category, largest first. Unknown categories are
/// labelled `Unknown`.
#[must_use]
pub fn category_breakdown(
    transactions: &[transactions::Model],
    categories: &[categories::Model],
) -> Vec<CategoryTotal> {
    let mut grouped: HashMap<i32, f64> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
    {
        *grouped.entry(tx.category_id).or_default() += tx.amount;
    }

    let mut totals: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_id,
            name: category_name(categories, category_id).to_string(),
            total,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then(a.category_id.cmp(&b.category_id))
    });
    totals
}

#[must_use]
pub fn category_name(categories: &[categories::Model], id: i32) -> &str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map_or("Unknown", |c| c.name.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    /// e.g. `Mar 2024`
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expense: f64,
}

/// Income and expense per calendar month for the `months` months ending with
/// the one containing `today`, oldest first.
#[must_use]
pub fn monthly_trend(
    transactions: &[transactions::Model],
    today: NaiveDate,
    months: u32,
) -> Vec<MonthTotals> {
    let first_of_month = today.with_day(1).unwrap_or(today);

    (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(chrono::Months::new(back)))
        .map(|start| {
            let mut bucket = MonthTotals {
                label: start.format("%b %Y").to_string(),
                year: start.year(),
                month: start.month(),
                income: 0.0,
                expense: 0.0,
            };

            for tx in transactions {
                let Some(date) = parse_date(&tx.date) else {
                    continue;
                };
                if date.year() != bucket.year || date.month() != bucket.month {
                    continue;
                }
                match tx.kind {
                    TransactionKind::Income => bucket.income += tx.amount,
                    TransactionKind::Expense => bucket.expense += tx.amount,
                }
            }

            bucket
        })
        .collect()
}

#[must_use]
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "TZS" => "TSh",
        "KES" => "KSh",
        other => other,
    }
}

#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{}{amount:.2}", currency_symbol(currency))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn tx(id: i32, kind: TransactionKind, amount: f64, category_id: i32, date: &str) -> transactions::Model {
        transactions::Model {
            id,
            user_id: 1,
            kind,
            amount,
            category_id,
            date: date.to_string(),
            note: String::new(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
            synced: false,
        }
    }

    pub fn category(id: i32, name: &str) -> categories::Model {
        categories::Model {
            id,
            user_id: 1,
            name: name.to_string(),
            kind: TransactionKind::Expense,
            icon: "circle".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::TransactionKind::{Expense, Income};

    #[test]
    fn dashboard_splits_all_time_and_current_month() {
        let rows = vec![
            tx(1, Income, 1000.0, 1, "2024-03-01"),
            tx(2, Expense, 200.0, 5, "2024-03-10"),
            tx(3, Income, 500.0, 1, "2024-02-01"),
            tx(4, Expense, 50.0, 5, "2023-03-15"),
        ];

        let summary = dashboard(&rows, date(2024, 3, 20));
        assert_eq!(summary.total_income, 1500.0);
        assert_eq!(summary.total_expense, 250.0);
        assert_eq!(summary.balance, 1250.0);
        assert_eq!(summary.month_income, 1000.0);
        assert_eq!(summary.month_expense, 200.0);
        assert_eq!(summary.month_remaining, 800.0);
    }

    #[test]
    fn filter_combines_criteria() {
        let mut rows = vec![
            tx(1, Expense, 10.0, 5, "2024-03-19"),
            tx(2, Expense, 20.0, 5, "2024-02-28"),
            tx(3, Income, 30.0, 1, "2024-03-20"),
            tx(4, Expense, 40.0, 6, "2024-03-20"),
        ];
        rows[0].note = "Weekly GROCERY run".to_string();
        rows[3].note = "grocery delivery".to_string();

        let today = date(2024, 3, 20);
        let month_expenses = filter_transactions(
            &rows,
            &TransactionFilter {
                kind: Some(Expense),
                period: Some(FilterPeriod::Month),
                ..Default::default()
            },
            today,
        );
        assert_eq!(month_expenses.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 1]);

        let search = filter_transactions(
            &rows,
            &TransactionFilter {
                search: Some("grocery".to_string()),
                category_id: Some(5),
                ..Default::default()
            },
            today,
        );
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].id, 1);

        let today_only = filter_transactions(
            &rows,
            &TransactionFilter {
                period: Some(FilterPeriod::Today),
                ..Default::default()
            },
            today,
        );
        assert_eq!(today_only.len(), 2);
    }

    #[test]
    fn breakdown_sorted_descending_with_unknown_label() {
        let rows = vec![
            tx(1, Expense, 10.0, 5, "2024-03-01"),
            tx(2, Expense, 40.0, 6, "2024-03-02"),
            tx(3, Expense, 15.0, 5, "2024-03-03"),
            tx(4, Income, 99.0, 1, "2024-03-03"),
            tx(5, Expense, 1.0, 42, "2024-03-03"),
        ];
        let cats = vec![category(5, "Groceries"), category(6, "Rent")];

        let totals = category_breakdown(&rows, &cats);
        let view: Vec<_> = totals.iter().map(|t| (t.name.as_str(), t.total)).collect();
        assert_eq!(view, vec![("Rent", 40.0), ("Groceries", 25.0), ("Unknown", 1.0)]);
    }

    #[test]
    fn trend_covers_requested_months_oldest_first() {
        let rows = vec![
            tx(1, Income, 100.0, 1, "2024-01-05"),
            tx(2, Expense, 30.0, 5, "2024-03-02"),
            tx(3, Expense, 70.0, 5, "2023-09-30"),
        ];

        let trend = monthly_trend(&rows, date(2024, 3, 31), 6);
        assert_eq!(trend.len(), 6);
        assert_eq!(trend[0].label, "Oct 2023");
        assert_eq!(trend[5].label, "Mar 2024");
        assert_eq!(trend[3].income, 100.0);
        assert_eq!(trend[5].expense, 30.0);
        assert!(trend.iter().all(|m| !(m.year == 2023 && m.month == 9)));
    }

    #[test]
    fn formats_known_and_unknown_currencies() {
        assert_eq!(format_amount(12.5, "USD"), "$12.50");
        assert_eq!(format_amount(3.0, "KES"), "KSh3.00");
        assert_eq!(format_amount(1.234, "CHF"), "CHF1.23");
    }
}
