//! Calendar event command handlers

use anyhow::anyhow;

use crate::cli::{CliContext, EventCommands};
use crate::models::finance::EventInput;

pub async fn cmd_event(ctx: &CliContext, command: EventCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;
    let user_id = session.user_id;

    match command {
        EventCommands::Add {
            title,
            date,
            time,
            notes,
        } => {
            let event = finance
                .add_event(
                    user_id,
                    EventInput {
                        title,
                        date,
                        time,
                        notes,
                    },
                )
                .await?;
            println!(
                "✓ Scheduled: {} at {} (ID: {})",
                event.title, event.datetime, event.id
            );
        }

        EventCommands::List => {
            let events = finance.list_events(user_id).await?;
            if events.is_empty() {
                println!("No events scheduled.");
                return Ok(());
            }

            println!("Events ({} total)", events.len());
            println!("{:-<70}", "");
            for event in &events {
                let reminded = if event.notified_at.is_some() { " 🔔" } else { "" };
                println!("{} {}{}", event.datetime.replace('T', " "), event.title, reminded);
                if event.notes.is_empty() {
                    println!("  ID: {}", event.id);
                } else {
                    println!("  ID: {} | {}", event.id, event.notes);
                }
            }
        }

        EventCommands::Edit {
            id,
            title,
            date,
            time,
            notes,
        } => {
            let existing = finance
                .list_events(user_id)
                .await?
                .into_iter()
                .find(|event| event.id == id)
                .ok_or_else(|| anyhow!("Event {id} not found"))?;

            let event = finance
                .update_event(
                    user_id,
                    id,
                    EventInput {
                        title: title.unwrap_or(existing.title),
                        date: date.unwrap_or(existing.date),
                        time: time.or(existing.time),
                        notes: notes.unwrap_or(existing.notes),
                    },
                )
                .await?;
            println!("✓ Updated event {} ({})", event.id, event.datetime);
        }

        EventCommands::Delete { id } => {
            finance.delete_event(user_id, id).await?;
            println!("✓ Deleted event {id}");
        }
    }

    Ok(())
}
