mod account;
mod backup;
mod bills;
mod budgets;
mod categories;
mod events;
mod license;
mod reports;
mod settings;
mod sync;
mod transactions;

pub use account::{cmd_login, cmd_logout, cmd_register, cmd_whoami};
pub use backup::{cmd_export, cmd_import};
pub use bills::cmd_bill;
pub use budgets::cmd_budget;
pub use categories::cmd_category;
pub use events::cmd_event;
pub use license::{cmd_activate, cmd_generate_code, cmd_license, cmd_trial};
pub use reports::{cmd_dashboard, cmd_report};
pub use settings::cmd_settings;
pub use sync::{cmd_offline, cmd_online, cmd_reminders, cmd_sync};
pub use transactions::cmd_tx;

use crate::cli::CliContext;
use crate::domain::UserId;

/// Currency code from the user's settings, for formatting amounts.
pub(crate) async fn currency(ctx: &CliContext, user_id: UserId) -> anyhow::Result<String> {
    Ok(ctx.state.finance_service.get_settings(user_id).await?.currency)
}
