use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::parse_date;
use crate::constants::budget::{NEAR_LIMIT_PERCENT, OVER_BUDGET_PERCENT};
use crate::domain::{BudgetPeriod, TransactionKind};
use crate::entities::{budgets, transactions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetState {
    OnTrack,
    NearLimit,
    OverBudget,
}

impl BudgetState {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= OVER_BUDGET_PERCENT {
            Self::OverBudget
        } else if percentage >= NEAR_LIMIT_PERCENT {
            Self::NearLimit
        } else {
            Self::OnTrack
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::NearLimit => "Near Limit",
            Self::OverBudget => "Over Budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_id: i32,
    pub category_id: i32,
    pub period: BudgetPeriod,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub state: BudgetState,
}

/// First day of the period containing `today`.
#[must_use]
pub fn period_start(period: BudgetPeriod, today: NaiveDate) -> NaiveDate {
    let month = match period {
        BudgetPeriod::Monthly => today.month(),
        BudgetPeriod::Quarterly => (today.month0() / 3) * 3 + 1,
        BudgetPeriod::Yearly => 1,
    };
    NaiveDate::from_ymd_opt(today.year(), month, 1).unwrap_or(today)
}

/// Spending against one budget in its current period.
///
/// Only expense transactions in the budget's category dated on or after the
/// period start count. A non-positive limit reports 100% once anything is spent.
#[must_use]
pub fn budget_status(
    budget: &budgets::Model,
    transactions: &[transactions::Model],
    today: NaiveDate,
) -> BudgetStatus {
    let since = period_start(budget.period, today);

    let spent: f64 = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && tx.category_id == budget.category_id)
        .filter(|tx| parse_date(&tx.date).is_some_and(|d| d >= since))
        .map(|tx| tx.amount)
        .sum();

    let percentage = if budget.amount > 0.0 {
        spent * 100.0 / budget.amount
    } else if spent > 0.0 {
        OVER_BUDGET_PERCENT
    } else {
        0.0
    };

    BudgetStatus {
        budget_id: budget.id,
        category_id: budget.category_id,
        period: budget.period,
        limit: budget.amount,
        spent,
        remaining: budget.amount - spent,
        percentage,
        state: BudgetState::from_percentage(percentage),
    }
}

/// Budgets at or past the near-limit threshold.
#[must_use]
pub fn budget_alerts(
    budgets: &[budgets::Model],
    transactions: &[transactions::Model],
    today: NaiveDate,
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|b| budget_status(b, transactions, today))
        .filter(|s| s.percentage >= NEAR_LIMIT_PERCENT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionKind::{Expense, Income};
    use crate::reports::test_support::{date, tx};

    fn groceries_budget(period: BudgetPeriod) -> budgets::Model {
        budgets::Model {
            id: 1,
            user_id: 1,
            category_id: 5,
            amount: 100.0,
            period,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn period_starts() {
        let today = date(2024, 8, 17);
        assert_eq!(period_start(BudgetPeriod::Monthly, today), date(2024, 8, 1));
        assert_eq!(period_start(BudgetPeriod::Quarterly, today), date(2024, 7, 1));
        assert_eq!(period_start(BudgetPeriod::Yearly, today), date(2024, 1, 1));
        assert_eq!(period_start(BudgetPeriod::Quarterly, date(2024, 3, 31)), date(2024, 1, 1));
    }

    #[test]
    fn near_limit_then_over_budget() {
        let today = date(2024, 3, 20);
        let budget = groceries_budget(BudgetPeriod::Monthly);
        let mut rows = vec![tx(1, Expense, 85.0, 5, "2024-03-05")];

        let status = budget_status(&budget, &rows, today);
        assert_eq!(status.spent, 85.0);
        assert_eq!(status.percentage, 85.0);
        assert_eq!(status.remaining, 15.0);
        assert_eq!(status.state, BudgetState::NearLimit);
        assert_eq!(status.state.label(), "Near Limit");

        rows.push(tx(2, Expense, 20.0, 5, "2024-03-18"));
        let status = budget_status(&budget, &rows, today);
        assert_eq!(status.percentage, 105.0);
        assert_eq!(status.state, BudgetState::OverBudget);
        assert_eq!(status.state.label(), "Over Budget");
    }

    #[test]
    fn ignores_other_categories_income_and_previous_periods() {
        let today = date(2024, 3, 20);
        let budget = groceries_budget(BudgetPeriod::Monthly);
        let rows = vec![
            tx(1, Expense, 30.0, 5, "2024-02-29"),
            tx(2, Income, 30.0, 5, "2024-03-02"),
            tx(3, Expense, 30.0, 6, "2024-03-02"),
            tx(4, Expense, 10.0, 5, "2024-03-01"),
        ];

        let status = budget_status(&budget, &rows, today);
        assert_eq!(status.spent, 10.0);
        assert_eq!(status.state, BudgetState::OnTrack);

        let quarterly = budget_status(&groceries_budget(BudgetPeriod::Quarterly), &rows, today);
        assert_eq!(quarterly.spent, 40.0);
    }

    #[test]
    fn alerts_include_only_budgets_at_eighty_percent() {
        let today = date(2024, 3, 20);
        let mut second = groceries_budget(BudgetPeriod::Monthly);
        second.id = 2;
        second.category_id = 6;
        let budgets = vec![groceries_budget(BudgetPeriod::Monthly), second];
        let rows = vec![
            tx(1, Expense, 80.0, 5, "2024-03-05"),
            tx(2, Expense, 79.0, 6, "2024-03-05"),
        ];

        let alerts = budget_alerts(&budgets, &rows, today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].budget_id, 1);
        assert_eq!(alerts[0].state, BudgetState::NearLimit);
    }
}
