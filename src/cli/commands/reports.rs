//! Dashboard and report command handlers

use crate::cli::CliContext;
use crate::reports::{BudgetState, format_amount};

pub async fn cmd_dashboard(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let view = ctx.state.finance_service.dashboard(session.user_id).await?;
    let currency = view.currency.as_str();
    let summary = &view.summary;

    println!("Welcome back, {}", session.name);
    println!("{:-<70}", "");
    println!("  Balance:        {}", format_amount(summary.balance, currency));
    println!(
        "  Total income:   {} | Total expense: {}",
        format_amount(summary.total_income, currency),
        format_amount(summary.total_expense, currency)
    );
    println!(
        "  This month:     +{} / -{} | Remaining: {}",
        format_amount(summary.month_income, currency),
        format_amount(summary.month_expense, currency),
        format_amount(summary.month_remaining, currency)
    );

    println!();
    println!("Recent Transactions");
    println!("{:-<70}", "");
    if view.recent_transactions.is_empty() {
        println!("  None yet.");
    }
    for tx in &view.recent_transactions {
        println!(
            "  {} {:<8} {:>12}  {}",
            tx.date,
            tx.kind,
            format_amount(tx.amount, currency),
            tx.note
        );
    }

    println!();
    println!("Upcoming Bills");
    println!("{:-<70}", "");
    if view.upcoming_bills.is_empty() {
        println!("  Nothing due in the next 30 days.");
    }
    for status in &view.upcoming_bills {
        println!(
            "  {} {} {} [{}]",
            status.bill.due_date,
            status.bill.name,
            format_amount(status.bill.amount, currency),
            status.state.label()
        );
    }

    if !view.budget_alerts.is_empty() {
        println!();
        println!("Budget Alerts");
        println!("{:-<70}", "");
        for alert in &view.budget_alerts {
            let indicator = if alert.state == BudgetState::OverBudget {
                "🔴"
            } else {
                "🟡"
            };
            println!(
                "  {} Budget {} at {:.0}% ({} of {})",
                indicator,
                alert.budget_id,
                alert.percentage,
                format_amount(alert.spent, currency),
                format_amount(alert.limit, currency)
            );
        }
    }

    Ok(())
}

pub async fn cmd_report(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let report = ctx.state.finance_service.report(session.user_id).await?;
    let currency = report.currency.as_str();

    println!("Spending by Category");
    println!("{:-<70}", "");
    if report.breakdown.is_empty() {
        println!("  No expenses recorded.");
    }
    let total: f64 = report.breakdown.iter().map(|c| c.total).sum();
    for entry in &report.breakdown {
        let share = if total > 0.0 {
            entry.total / total * 100.0
        } else {
            0.0
        };
        println!(
            "  {:<24} {:>12} {:>5.1}%",
            entry.name,
            format_amount(entry.total, currency),
            share
        );
    }

    println!();
    println!("Monthly Trend");
    println!("{:-<70}", "");
    for month in &report.trend {
        println!(
            "  {:<10} +{:>12} -{:>12}",
            month.label,
            format_amount(month.income, currency),
            format_amount(month.expense, currency)
        );
    }

    println!();
    println!("Last Six Months");
    println!("{:-<70}", "");
    for month in &report.comparison {
        println!(
            "  {:<10} net {}",
            month.label,
            format_amount(month.income - month.expense, currency)
        );
    }

    Ok(())
}
