//! CLI module - Command-line interface for `PesaFlow`
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use anyhow::bail;
use clap::{Parser, Subcommand};

use crate::domain::{BudgetPeriod, Recurrence, Session, Theme, TransactionKind};
use crate::license::LicensePlan;
use crate::reports::FilterPeriod;
use crate::session::SessionStore;
use crate::state::SharedState;

/// `PesaFlow` - personal finance tracker
/// Transactions, budgets, bills and reminders with an offline sync queue
#[derive(Parser)]
#[command(name = "pesaflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in to an existing account
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Start the one-day free trial
    Trial,

    /// Activate a license code
    Activate {
        /// Code in the form XXXX-XXXX-XXXX-XXXX
        code: String,
    },

    /// Show license status
    License,

    /// Generate an activation code for a plan
    GenerateCode {
        /// TRIAL, WEEK, MONTH, YEAR or LIFETIME (or the code tag)
        plan: LicensePlan,
    },

    /// Manage transactions
    #[command(alias = "transaction")]
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },

    /// Manage budgets
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },

    /// Manage bills
    Bill {
        #[command(subcommand)]
        command: BillCommands,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage calendar events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Totals, recent transactions, upcoming bills and budget alerts
    #[command(alias = "dash")]
    Dashboard,

    /// Category breakdown and monthly trends
    Report,

    /// Write all data to a JSON file
    Export {
        path: String,
    },

    /// Load data from a JSON export
    Import {
        path: String,
    },

    /// Drain the sync queue now
    Sync {
        /// Only show pending entries
        #[arg(long)]
        status: bool,
    },

    /// Mark the device online and drain the queue
    Online,

    /// Mark the device offline
    Offline,

    /// Run one reminder pass
    Reminders,

    /// Run as background daemon with scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a transaction
    Add {
        kind: TransactionKind,
        amount: f64,
        #[arg(long)]
        category: i32,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// List transactions, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        category: Option<i32>,
        /// today, week, month or year
        #[arg(long)]
        period: Option<FilterPeriod>,
        /// Search notes
        #[arg(long)]
        search: Option<String>,
    },

    /// Change a transaction
    Edit {
        id: i32,
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<i32>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a transaction
    #[command(alias = "rm")]
    Delete { id: i32 },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a spending limit for a category
    Add {
        #[arg(long)]
        category: i32,
        amount: f64,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
    },

    /// List budgets with spending
    #[command(alias = "ls")]
    List,

    /// Change a budget
    Edit {
        id: i32,
        #[arg(long)]
        category: Option<i32>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        period: Option<BudgetPeriod>,
    },

    /// Delete a budget
    #[command(alias = "rm")]
    Delete { id: i32 },
}

#[derive(Subcommand)]
pub enum BillCommands {
    /// Add a bill
    Add {
        name: String,
        amount: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long)]
        category: i32,
        #[arg(long, default_value = "none")]
        recurrence: Recurrence,
    },

    /// List bills with their status
    #[command(alias = "ls")]
    List,

    /// Change a bill
    Edit {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        category: Option<i32>,
        #[arg(long)]
        recurrence: Option<Recurrence>,
    },

    /// Mark a bill paid and record the payment
    Pay { id: i32 },

    /// Mark a bill unpaid
    Unpay { id: i32 },

    /// Delete a bill
    #[command(alias = "rm")]
    Delete { id: i32 },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        name: String,
        kind: TransactionKind,
        #[arg(long, default_value = "tag")]
        icon: String,
    },

    /// List categories
    #[command(alias = "ls")]
    List,

    /// Delete an unused category
    #[command(alias = "rm")]
    Delete { id: i32 },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Schedule an event
    Add {
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM (UTC)
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List events
    #[command(alias = "ls")]
    List,

    /// Change an event
    Edit {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an event
    #[command(alias = "rm")]
    Delete { id: i32 },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        locale: Option<String>,
    },
}

/// What every command handler works against.
pub struct CliContext {
    pub state: SharedState,
    pub sessions: SessionStore,
}

impl CliContext {
    /// The logged-in user.
    pub fn session(&self) -> anyhow::Result<Session> {
        match self.sessions.current()? {
            Some(session) => Ok(session),
            None => bail!("Not logged in. Use `pesaflow login <email>` or `pesaflow register`."),
        }
    }

    /// The logged-in user, provided their license is valid.
    pub async fn licensed_session(&self) -> anyhow::Result<Session> {
        let session = self.session()?;
        if !self.state.license_service.check_valid(session.user_id).await? {
            bail!(
                "No valid license. Start a free trial with `pesaflow trial` or activate a code with `pesaflow activate <code>`."
            );
        }
        Ok(session)
    }
}

/// Reads a password from stdin when it was not passed as an argument.
pub(crate) fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    use std::io::Write;
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "pesaflow", "tx", "add", "expense", "12.50", "--category", "5", "--note", "lunch",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Tx {
                command:
                    TxCommands::Add {
                        kind,
                        amount,
                        category,
                        date,
                        note,
                    },
            }) => {
                assert_eq!(kind, TransactionKind::Expense);
                assert!((amount - 12.5).abs() < f64::EPSILON);
                assert_eq!(category, 5);
                assert!(date.is_none());
                assert_eq!(note, "lunch");
            }
            _ => panic!("expected tx add"),
        }
    }

    #[test]
    fn parses_plan_names_and_tags() {
        let cli = Cli::try_parse_from(["pesaflow", "generate-code", "MNTH"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::GenerateCode {
                plan: LicensePlan::Month
            })
        ));

        assert!(Cli::try_parse_from(["pesaflow", "generate-code", "forever"]).is_err());
    }

    #[test]
    fn sync_status_flag() {
        let cli = Cli::try_parse_from(["pesaflow", "sync", "--status"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Sync { status: true })));
    }
}
