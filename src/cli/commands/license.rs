//! License command handlers

use crate::cli::CliContext;
use crate::license::{self, LicensePlan, LicenseStatus};

pub async fn cmd_trial(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let license = ctx
        .state
        .license_service
        .start_free_trial(session.user_id)
        .await?;

    println!("✓ Free trial started");
    println!("  Expires: {}", license.expires_at);
    Ok(())
}

pub async fn cmd_activate(ctx: &CliContext, code: &str) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let license = ctx
        .state
        .license_service
        .activate(session.user_id, code)
        .await?;

    println!("✓ {} license activated", license.plan);
    match license.plan {
        LicensePlan::Lifetime => println!("  Never expires"),
        _ => println!("  Expires: {}", license.expires_at),
    }
    Ok(())
}

pub async fn cmd_license(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let info = ctx.state.license_service.status(session.user_id).await?;

    let indicator = match info.status {
        LicenseStatus::Active => "🟢",
        LicenseStatus::Expired => "🔴",
        LicenseStatus::Inactive => "•",
    };
    println!("{indicator} {}", info.message());

    if let Some(plan) = info.plan {
        let kind = if info.is_trial { "trial" } else { "paid" };
        println!("  Plan: {plan} ({kind}) | Status: {}", info.status);
    }
    if let Some(activated_at) = &info.activated_at {
        println!("  Activated: {activated_at}");
    }
    if let Some(expires_at) = &info.expires_at {
        println!("  Expires: {expires_at}");
    }

    Ok(())
}

pub fn cmd_generate_code(plan: LicensePlan) {
    println!("{}", license::generate_code(plan));
}
