//! Session commands — `taskboard login|register|logout|whoami`.

use anyhow::{Context, Result};
use console::style;

use taskboard::board::auth;
use taskboard::board::models::NewAccount;
use taskboard::ui::icons::CHECK;
use taskboard::ui::render;

use super::{App, password_or_prompt};
use crate::Cli;

pub async fn cmd_login(cli: &Cli, email: &str, password: Option<String>) -> Result<()> {
    let app = App::connect(cli)?;
    let password = password_or_prompt(password)?;
    let creds = auth::login(&app.gateway, email, &password)
        .await
        .context("Login failed")?;
    let who = creds
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_else(|| email.to_string());
    println!("{}Logged in as {}", CHECK, style(who).bold());
    Ok(())
}

pub async fn cmd_register(
    cli: &Cli,
    email: &str,
    fname: &str,
    lname: &str,
    password: Option<String>,
) -> Result<()> {
    let app = App::connect(cli)?;
    let account = NewAccount {
        email: email.trim().to_string(),
        password: password_or_prompt(password)?,
        fname: fname.trim().to_string(),
        lname: lname.trim().to_string(),
    };
    auth::register(&app.gateway, &account)
        .await
        .context("Registration failed")?;
    println!(
        "{}Registered {}. Run `taskboard login {}` to sign in.",
        CHECK, account.email, account.email
    );
    Ok(())
}

pub fn cmd_logout(cli: &Cli) -> Result<()> {
    let app = App::connect(cli)?;
    auth::logout(&app.gateway).context("Failed to clear session")?;
    println!("{}Logged out", CHECK);
    Ok(())
}

pub fn cmd_whoami(cli: &Cli) -> Result<()> {
    let app = App::authenticated(cli)?;
    match app.gateway.session().user() {
        Some(user) => println!("{}", render::user_line(&user)),
        None => println!("Logged in (no user details stored)"),
    }
    println!(
        "Session: {}",
        style(app.config.session_path.display()).dim()
    );
    Ok(())
}
