pub mod cli;
pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod license;
pub mod models;
pub mod reports;
pub mod services;
pub mod session;
pub mod state;

use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

use clap::Parser;
use cli::commands::{
    cmd_activate, cmd_bill, cmd_budget, cmd_category, cmd_dashboard, cmd_event, cmd_export,
    cmd_generate_code, cmd_import, cmd_license, cmd_login, cmd_logout, cmd_offline, cmd_online,
    cmd_register, cmd_reminders, cmd_report, cmd_settings, cmd_sync, cmd_trial, cmd_tx,
    cmd_whoami,
};
use cli::{Cli, CliContext, Commands};
pub use config::Config;
use domain::events::NotificationEvent;
use services::Scheduler;
use session::SessionStore;
use state::SharedState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match &command {
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            return Ok(());
        }
        Commands::GenerateCode { plan } => {
            cmd_generate_code(*plan);
            return Ok(());
        }
        _ => {}
    }

    let sessions = SessionStore::new(&config.general.session_path);
    let state = SharedState::new(config).await?;

    if let Some(online) = sessions.load()?.online {
        state.queue.connectivity().set_online(online);
    }

    let ctx = CliContext { state, sessions };

    match command {
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(&ctx, name, email, password).await,
        Commands::Login { email, password } => cmd_login(&ctx, &email, password).await,
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami => cmd_whoami(&ctx).await,

        Commands::Trial => cmd_trial(&ctx).await,
        Commands::Activate { code } => cmd_activate(&ctx, &code).await,
        Commands::License => cmd_license(&ctx).await,

        Commands::Tx { command } => cmd_tx(&ctx, command).await,
        Commands::Budget { command } => cmd_budget(&ctx, command).await,
        Commands::Bill { command } => cmd_bill(&ctx, command).await,
        Commands::Category { command } => cmd_category(&ctx, command).await,
        Commands::Event { command } => cmd_event(&ctx, command).await,
        Commands::Settings { command } => cmd_settings(&ctx, command).await,

        Commands::Dashboard => cmd_dashboard(&ctx).await,
        Commands::Report => cmd_report(&ctx).await,

        Commands::Export { path } => cmd_export(&ctx, &path).await,
        Commands::Import { path } => cmd_import(&ctx, &path).await,

        Commands::Sync { status } => cmd_sync(&ctx, status).await,
        Commands::Online => cmd_online(&ctx).await,
        Commands::Offline => cmd_offline(&ctx).await,
        Commands::Reminders => cmd_reminders(&ctx).await,

        Commands::Daemon => run_daemon(ctx).await,

        Commands::Init | Commands::GenerateCode { .. } => Ok(()),
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_daemon(ctx: CliContext) -> anyhow::Result<()> {
    info!(
        "PesaFlow v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let CliContext { state, sessions } = ctx;

    let mut events = state.event_bus.subscribe();
    let events_handle = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(NotificationEvent::EventReminder {
                    title,
                    scheduled_for,
                    ..
                }) => {
                    println!("🔔 {title} at {scheduled_for}");
                }
                Ok(NotificationEvent::Error { message }) => error!("{message}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let scheduler = Arc::new(Scheduler::new(state, sessions));

    let scheduler_handle = {
        let sched = Arc::clone(&scheduler);
        tokio::spawn(async move {
            if let Err(e) = sched.start().await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler.stop().await;
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }
    events_handle.abort();
    info!("Daemon stopped");

    Ok(())
}
