//! Sync queue, connectivity and reminder command handlers

use crate::cli::CliContext;
use crate::services::{DrainReport, DrainSkip};

pub async fn cmd_sync(ctx: &CliContext, status_only: bool) -> anyhow::Result<()> {
    ctx.licensed_session().await?;
    let queue = &ctx.state.queue;

    if status_only {
        let pending = queue.list_pending().await?;
        let mode = if queue.connectivity().is_online() {
            "online"
        } else {
            "offline"
        };

        println!("Sync Queue ({} pending, {mode})", pending.len());
        println!("{:-<70}", "");
        if pending.is_empty() {
            println!("  Everything is synced.");
        }
        for entry in &pending {
            println!(
                "  #{} {:<20} queued {} | attempts: {}",
                entry.id, entry.kind, entry.created_at, entry.attempts
            );
            if let Some(error) = &entry.last_error {
                println!("      last error: {error}");
            }
        }
        return Ok(());
    }

    let report = queue.drain().await?;
    print_drain(&report);

    let remaining = queue.pending_count().await?;
    if remaining > 0 {
        println!("  {remaining} entries still pending");
    }
    Ok(())
}

pub async fn cmd_online(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.sessions.set_online(true)?;
    let queue = &ctx.state.queue;

    let report = if queue.connectivity().is_online() {
        queue.drain().await?
    } else {
        queue.set_online(true).await?
    };

    println!("✓ Online");
    print_drain(&report);
    Ok(())
}

pub async fn cmd_offline(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.sessions.set_online(false)?;
    ctx.state.queue.set_online(false).await?;

    println!("✓ Offline. Changes will be queued until you go online again.");
    Ok(())
}

pub async fn cmd_reminders(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let report = ctx.state.reminders.run_once(session.user_id).await?;

    if report.suppressed {
        println!("Notifications are turned off. Enable with: pesaflow settings set --notifications true");
    } else if report.fired == 0 {
        println!("No reminders due ({} events checked).", report.checked);
    } else {
        println!("🔔 {} reminder(s) sent", report.fired);
    }
    Ok(())
}

fn print_drain(report: &DrainReport) {
    match report.skipped {
        Some(DrainSkip::Offline) => println!("Offline: queue not drained."),
        Some(DrainSkip::InProgress) => println!("A sync is already running."),
        Some(DrainSkip::Disabled) => println!("Sync is disabled in config."),
        None => println!(
            "Synced: {} delivered, {} failed ({} attempted)",
            report.delivered, report.failed, report.attempted
        ),
    }
}
