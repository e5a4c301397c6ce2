//! Export and import command handlers

use std::path::Path;

use crate::cli::CliContext;

pub async fn cmd_export(ctx: &CliContext, path: &str) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let backup = ctx
        .state
        .backup_service
        .export_to_path(session.user_id, Path::new(path))
        .await?;

    let count = |rows: Option<usize>| rows.unwrap_or(0);
    println!("✓ Exported to {path}");
    println!(
        "  {} transactions | {} budgets | {} bills | {} categories",
        count(backup.transactions.as_ref().map(Vec::len)),
        count(backup.budgets.as_ref().map(Vec::len)),
        count(backup.bills.as_ref().map(Vec::len)),
        count(backup.categories.as_ref().map(Vec::len)),
    );

    Ok(())
}

pub async fn cmd_import(ctx: &CliContext, path: &str) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let counts = ctx
        .state
        .backup_service
        .import_from_path(session.user_id, Path::new(path))
        .await?;

    println!("✓ Imported from {path}");
    println!(
        "  {} transactions | {} budgets | {} bills | {} categories",
        counts.transactions, counts.budgets, counts.bills, counts.categories
    );

    Ok(())
}
