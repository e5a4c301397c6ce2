//! Settings command handlers

use crate::cli::{CliContext, SettingsCommands};
use crate::models::finance::SettingsPatch;
use crate::reports::currency_symbol;

pub async fn cmd_settings(ctx: &CliContext, command: SettingsCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;

    let settings = match command {
        SettingsCommands::Show => finance.get_settings(session.user_id).await?,
        SettingsCommands::Set {
            currency,
            theme,
            notifications,
            locale,
        } => {
            let updated = finance
                .update_settings(
                    session.user_id,
                    SettingsPatch {
                        currency,
                        theme,
                        notifications,
                        locale,
                    },
                )
                .await?;
            println!("✓ Settings updated");
            updated
        }
    };

    println!("Settings");
    println!("{:-<70}", "");
    println!(
        "  Currency:      {} ({})",
        settings.currency,
        currency_symbol(&settings.currency)
    );
    println!("  Theme:         {}", settings.theme);
    println!(
        "  Notifications: {}",
        if settings.notifications { "on" } else { "off" }
    );
    println!("  Locale:        {}", settings.locale);

    Ok(())
}
