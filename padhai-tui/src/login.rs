use anyhow::{Context, Result};
use padhai::domain::{Credentials, Registration};
use padhai::{HttpStudyApi, StudyApi};
use std::io::{self, BufRead, Write};
use tracing::info;

use crate::config::PadhaiConfig;
use crate::session_store;

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prompt for credentials, sign in and save the session token.
pub async fn run_login(config: &PadhaiConfig) -> Result<String> {
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let credentials = Credentials::new(&email, &password)?;

    let api = HttpStudyApi::new(&config.api_url, None, config.request_timeout())?;
    api.login(&credentials)
        .await
        .with_context(|| format!("Login to {} failed", config.api_url))?;

    let token = api
        .session_token()
        .context("Backend accepted the login but did not set a session cookie")?;
    session_store::save_session(&token)?;
    info!("session saved");

    match api.me().await {
        Ok(user) => println!("Welcome back, {}! Session saved.", user.first_name()),
        Err(_) => println!("Login successful. Session saved."),
    }
    Ok(token)
}

/// Prompt for a new account. The password has to be typed twice.
pub async fn run_register(config: &PadhaiConfig) -> Result<()> {
    let name = prompt("Name: ")?;
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    let registration = Registration::new(&name, &email, &password, &confirm)?;

    let api = HttpStudyApi::new(&config.api_url, None, config.request_timeout())?;
    api.register(&registration)
        .await
        .context("Registration failed")?;

    println!("Account created. Run `padhai-tui login` to sign in.");
    Ok(())
}
