//! Account command handlers

use crate::cli::{CliContext, password_or_prompt};
use crate::models::user::NewUser;

pub async fn cmd_register(
    ctx: &CliContext,
    name: String,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password_or_prompt(password)?;
    let session = ctx
        .state
        .account_service
        .register(NewUser {
            name,
            email,
            password,
            profile_image: None,
        })
        .await?;

    ctx.sessions.set_session(Some(session.clone()))?;

    println!("✓ Registered {} <{}>", session.name, session.email);
    println!();
    println!("Start a free trial with: pesaflow trial");
    println!("Or activate a code with: pesaflow activate <code>");

    Ok(())
}

pub async fn cmd_login(
    ctx: &CliContext,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password_or_prompt(password)?;
    let session = ctx.state.account_service.login(email, &password).await?;
    ctx.sessions.set_session(Some(session.clone()))?;

    println!("✓ Logged in as {} <{}>", session.name, session.email);

    let license = ctx.state.license_service.status(session.user_id).await?;
    println!("  {}", license.message());

    Ok(())
}

pub fn cmd_logout(ctx: &CliContext) -> anyhow::Result<()> {
    if ctx.sessions.current()?.is_none() {
        println!("Not logged in.");
        return Ok(());
    }

    ctx.sessions.set_session(None)?;
    println!("✓ Logged out");
    Ok(())
}

pub async fn cmd_whoami(ctx: &CliContext) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let user = ctx.state.account_service.profile(session.user_id).await?;

    println!("{} <{}>", user.name, user.email);
    println!("  ID: {} | Member since: {}", user.id, user.created_at);
    if let Some(image) = &user.profile_image {
        println!("  Profile image: {image}");
    }

    Ok(())
}
